//! Formats command implementation.

use kompression::FORMATS;
use serde::Serialize;

#[derive(Serialize)]
struct FormatInfo {
    name: &'static str,
    description: &'static str,
}

pub fn cmd_formats(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let formats: Vec<FormatInfo> = FORMATS
        .iter()
        .map(|entry| FormatInfo {
            name: entry.name,
            description: entry.description,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&formats)?);
        return Ok(());
    }

    let width = formats.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for format in &formats {
        println!("{:<width$}  {}", format.name, format.description);
    }
    println!();
    println!("{} formats", formats.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_listing() {
        let info = FormatInfo {
            name: "lz10",
            description: "Nintendo GBA/DS BIOS LZ77",
        };
        assert_eq!(
            serde_json::to_string(&info).unwrap(),
            r#"{"name":"lz10","description":"Nintendo GBA/DS BIOS LZ77"}"#
        );
    }
}
