fn main() -> anyhow::Result<()> {
    aerosol_risk::cli::main()
}
