fn main() -> anyhow::Result<()> {
    dagcalc::run()
}
