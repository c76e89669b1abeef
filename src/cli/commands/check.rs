//! Report whether configured engines and services are usable.

use console::style;

use crate::config::Settings;
use crate::ocr::create_backend;

/// Print OCR engine status and the service endpoints in use.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Engines").bold());
    println!("{}", "-".repeat(50));

    let mut engines = vec![("primary", settings.ocr.primary.as_str())];
    if let Some(fallback) = settings.ocr.fallback.as_deref() {
        engines.push(("fallback", fallback));
    }

    let mut all_ok = true;
    for (role, name) in engines {
        match create_backend(name, settings) {
            Ok(backend) => {
                let status = if backend.is_available() {
                    style("✓ available").green()
                } else {
                    all_ok = false;
                    style("✗ not available").red()
                };
                println!(
                    "  {:<10} {:<12} {}",
                    role,
                    backend.backend_type().display_name(),
                    status
                );
                if !backend.is_available() {
                    println!("             {}", style(backend.availability_hint()).dim());
                }
            }
            Err(e) => {
                all_ok = false;
                println!("  {:<10} {:<12} {}", role, name, style(format!("✗ {}", e)).red());
            }
        }
    }

    println!("\n{}", style("Services").bold());
    println!("{}", "-".repeat(50));
    if settings.corrector.enabled {
        println!("  {:<10} {}", "corrector", settings.corrector.endpoint);
    } else {
        println!("  {:<10} {}", "corrector", style("disabled").dim());
    }
    println!(
        "  {:<10} {:?} ({})",
        "summary", settings.summary.provider, settings.summary.model
    );

    if all_ok {
        println!("\n{} All configured engines are available", style("✓").green());
    } else {
        println!(
            "\n{} Some engines are unavailable; uploads may show engine errors",
            style("!").yellow()
        );
    }

    Ok(())
}
