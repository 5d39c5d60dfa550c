fn main() -> anyhow::Result<()> {
    meso_tiler_app::main()
}
