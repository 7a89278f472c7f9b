//! Ecosystem command

use colored::Colorize;

use crate::ecosystem::{Ecosystem, ProcessSpec};
use crate::errors::Result;

/// 输出进程管理器配置
pub fn render_ecosystem(apps: &[ProcessSpec], output: Option<&str>) -> Result<()> {
    let json = Ecosystem::new(apps.to_vec()).to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))?;
            println!(
                "{} Wrote {} process declaration(s) to {}",
                "✓".bold().green(),
                apps.len(),
                path.blue()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
