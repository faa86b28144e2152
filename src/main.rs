use anyhow::Result;

use engine::{Engine, WindowSettings};

fn main() -> Result<()> {
    pretty_env_logger::init();

    let engine = Engine::new(vec![WindowSettings::default()]);
    match engine {
        Err(err) => println!("{}", err),
        Ok(e) => e.run()?,
    }

    Ok(())
}
