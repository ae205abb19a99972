use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Print `value` as pretty JSON, or hand it to `table` for human output.
pub fn print_output<T, F>(value: &T, output: OutputFormat, table: F) -> anyhow::Result<()>
where
    T: serde::Serialize,
    F: FnOnce(&T),
{
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => table(value),
    }
    Ok(())
}
