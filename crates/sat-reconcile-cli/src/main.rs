fn main() -> anyhow::Result<()> {
    sat_reconcile_cli::run(std::env::args())
}
