mod account;
mod output;
mod session;
pub mod ui;

pub use account::{change_password, delete_account, register, update_profile};
pub use output::{print_output, OutputFormat};
pub use session::{decode, login, logout, logout_all, token};

use serde_json::Value;

/// Print the `{"message": ...}` confirmation the API returns for mutations.
fn print_message(resp: &Value, output: OutputFormat) -> anyhow::Result<()> {
    print_output(resp, output, |resp| {
        let text = resp
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("done");
        ui::done(text);
    })
}
