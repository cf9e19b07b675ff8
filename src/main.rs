use anyhow::Context;

fn main() -> anyhow::Result<()> {
    masknote::run().context("masknote failed to start")?;
    Ok(())
}
