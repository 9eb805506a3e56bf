//! `taskweave status` — Show configuration status.

use taskweave_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = taskweave_engine::registry_from_config(&config);

    println!("🧵 taskweave Status");
    println!("===================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.provider);
    println!("  Model:        {}", config.model);
    if let Some(url) = &config.api_url {
        println!("  API URL:      {url}");
    }
    println!("  Temperature:  {}", config.temperature);
    println!(
        "  API key:      {}",
        if config.has_api_key() { "configured" } else { "missing (fallback mode)" }
    );

    let engine = &config.engine;
    println!("\n  Engine limits:");
    println!("    Outer iterations: {}", engine.max_outer_iterations);
    println!("    Attempts/task:    {}", engine.max_attempts);
    match engine.max_steps {
        Some(cap) => println!("    Step cap:         {cap}"),
        None => println!("    Step cap:         off"),
    }
    println!("    Follow-up cues:   {}", engine.continuation_cues.join(", "));

    println!("\n  Capabilities:");
    for agent_type in registry.agent_types() {
        println!("    {agent_type:<16} {}", registry.tools_for(agent_type).join(", "));
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `taskweave onboard` first");
    }

    Ok(())
}
