//! Acoular microphone geometry files.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <MicArray name="square">
//! <pos	Name="Point 1"	x="-0.5"	y="-0.5"	z="-1.0" />
//! </MicArray>
//! ```

use std::fmt::Write;
use std::path::Path;

use nalgebra::Vector3;

use crate::mic_array::MicrophoneArray;
use crate::{SetupError, SetupResult};

/// Reads a `<MicArray>` file. The array is named after the file stem.
pub fn load_mic_xml(path: &Path) -> SetupResult<MicrophoneArray> {
    let content = std::fs::read_to_string(path)?;
    let positions = parse_positions(&content).map_err(|reason| SetupError::MicFile {
        path: path.to_path_buf(),
        reason,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MicrophoneArray::new(name, positions)?)
}

pub fn save_mic_xml(path: &Path, array: &MicrophoneArray) -> SetupResult<()> {
    std::fs::write(path, format_mic_xml(array))?;
    Ok(())
}

pub fn format_mic_xml(array: &MicrophoneArray) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let _ = writeln!(xml, "<MicArray name=\"{}\">", array.name());
    for (i, p) in array.positions().iter().enumerate() {
        let _ = writeln!(
            xml,
            "<pos\tName=\"Point {}\"\tx=\"{}\"\ty=\"{}\"\tz=\"{}\" />",
            i + 1,
            p.x,
            p.y,
            p.z
        );
    }
    xml.push_str("</MicArray>");
    xml
}

fn parse_positions(content: &str) -> Result<Vec<Vector3<f64>>, String> {
    if !content.contains("<MicArray") {
        return Err("missing <MicArray> root element".to_string());
    }
    let mut positions = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find("<pos") {
        let tail = &rest[start + 4..];
        let end = tail
            .find('>')
            .ok_or_else(|| format!("unterminated <pos> element #{}", positions.len() + 1))?;
        let tag = &tail[..end];
        let element = positions.len() + 1;
        let coord = |key: &str| -> Result<f64, String> {
            let raw = attribute(tag, key)
                .ok_or_else(|| format!("<pos> element #{element} has no '{key}' attribute"))?;
            raw.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad '{key}' value '{raw}': {e}"))
        };
        let (x, y, z) = (coord("x")?, coord("y")?, coord("z")?);
        positions.push(Vector3::new(x, y, z));
        rest = &tail[end..];
    }
    if positions.is_empty() {
        return Err("no <pos> elements".to_string());
    }
    Ok(positions)
}

/// Value of attribute `key` inside a tag body, matched as a whole word.
fn attribute<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    let mut search = 0;
    while let Some(found) = tag[search..].find(key) {
        let at = search + found;
        let before_ok = at == 0 || tag[..at].ends_with(|c: char| c.is_whitespace());
        let after = tag[at + key.len()..].trim_start();
        if before_ok && let Some(value) = after.strip_prefix('=') {
            let value = value.trim_start();
            let quote = value.chars().next()?;
            if quote == '"' || quote == '\'' {
                let body = &value[1..];
                return body.find(quote).map(|close| &body[..close]);
            }
        }
        search = at + key.len();
    }
    None
}
