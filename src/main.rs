fn main() -> anyhow::Result<()> {
    form_builder::cli::run_cli()
}
