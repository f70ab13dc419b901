//! services/dashboard/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the dashboard API.
//!
//! Usage: `openapi [PATH]`. `PATH` defaults to `openapi.json`; `-` prints to stdout.

use dashboard_lib::web::ApiDoc;
use std::io::Write;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let api_doc = ApiDoc::openapi();
    let document = api_doc.to_pretty_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        std::fs::write(&target, document)?;
        eprintln!(
            "OpenAPI document for {} paths written to {}",
            api_doc.paths.paths.len(),
            target
        );
    }
    Ok(())
}
