use anyhow::Result;
use owo_colors::OwoColorize;
use pocketcal_core::EngineConfig;

pub fn run() -> Result<()> {
    let config_path = EngineConfig::config_path()?;
    let config = EngineConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Events:     {}", config.events_path().display());
    println!("  Calendar:   {}", config.events_path().join(&config.canonical_file).display());

    println!();
    println!("{}", "Timing".bold());
    println!("  Max FPS:        {}", config.max_fps);
    println!("  Key debounce:   {}", humantime::format_duration(config.key_debounce));
    println!("  Messages:       {}", humantime::format_duration(config.message_duration));
    println!("  Repeat help:    {}", humantime::format_duration(config.help_duration));

    Ok(())
}
