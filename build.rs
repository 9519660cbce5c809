use std::collections::HashSet;
use std::fs;

const REGISTRY_PATH: &str = "src/engine/registry/builtin-registry.toml";

fn main() {
    // Tell Cargo to rerun if the built-in registry snapshot changes
    println!("cargo:rerun-if-changed={}", REGISTRY_PATH);

    let contents = fs::read_to_string(REGISTRY_PATH)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", REGISTRY_PATH, e));
    let registry: toml::Value = contents
        .parse()
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", REGISTRY_PATH, e));

    validate_registry(&registry);
}

/// Validate the TOML registry structure at build time
fn validate_registry(registry: &toml::Value) {
    let elements = registry
        .get("element")
        .and_then(|e| e.as_array())
        .expect("TOML must have [[element]] array");

    assert!(!elements.is_empty(), "Must have at least one element defined");

    let mut names = HashSet::new();
    let mut total_pads = 0;

    for element in elements {
        let table = element.as_table().expect("Element must be a table");

        let name = table
            .get("name")
            .and_then(|v| v.as_str())
            .expect("Element must have 'name' field");

        assert!(names.insert(name), "Duplicate element name: {}", name);

        let klass = table
            .get("klass")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| panic!("Element '{}' missing 'klass' field", name));
        assert!(
            !klass.is_empty() && klass.split('/').all(|t| !t.is_empty()),
            "Element '{}' has malformed klass '{}'",
            name,
            klass
        );

        if let Some(rank) = table.get("rank") {
            assert!(
                rank.as_integer().is_some_and(|r| r >= 0),
                "Element '{}' rank must be a non-negative integer",
                name
            );
        }

        let Some(pads) = table.get("pad").and_then(|p| p.as_array()) else {
            continue;
        };

        let mut pad_names = HashSet::new();
        for pad in pads {
            let pad_table = pad
                .as_table()
                .unwrap_or_else(|| panic!("Pad in element '{}' must be a table", name));

            let pad_name = pad_table
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_else(|| panic!("Pad in element '{}' must have 'name' field", name));

            assert!(
                pad_names.insert(pad_name),
                "Duplicate pad '{}' in element '{}'",
                pad_name,
                name
            );

            let direction = pad_table.get("direction").and_then(|v| v.as_str());
            assert!(
                matches!(direction, Some("sink" | "src" | "source")),
                "Pad '{}' in element '{}' has invalid direction {:?}",
                pad_name,
                name,
                direction
            );

            if let Some(presence) = pad_table.get("presence").and_then(|v| v.as_str()) {
                assert!(
                    matches!(presence, "always" | "sometimes" | "request"),
                    "Pad '{}' in element '{}' has invalid presence '{}'",
                    pad_name,
                    name,
                    presence
                );
            }

            let caps = pad_table
                .get("caps")
                .and_then(|v| v.as_str())
                .unwrap_or_else(|| {
                    panic!("Pad '{}' in element '{}' missing 'caps' field", pad_name, name)
                });
            if let Err(msg) = validate_caps(caps) {
                panic!(
                    "Pad '{}' in element '{}' has malformed caps '{}': {}",
                    pad_name, name, caps, msg
                );
            }

            total_pads += 1;
        }
    }

    println!(
        "cargo:warning=Validated {} elements with {} pad templates",
        elements.len(),
        total_pads
    );
}

const CAPS_TYPES: &[&str] = &[
    "int", "i", "uint", "gint", "guint", "fraction", "GstFraction", "boolean", "bool", "b",
    "string", "str", "s", "bitmask", "GstBitmask",
];

/// Check the caps text splits into named structures of `key=value` fields
fn validate_caps(caps: &str) -> Result<(), String> {
    let caps = caps.trim();
    if caps.is_empty() {
        return Err("empty caps".to_string());
    }
    if matches!(caps, "ANY" | "EMPTY" | "NONE") {
        return Ok(());
    }

    for structure in split_top_level(caps, ';')? {
        if structure.trim().is_empty() {
            continue;
        }
        let mut parts = split_top_level(structure, ',')?.into_iter();
        let media_type = parts.next().unwrap_or_default().trim();
        if media_type.is_empty() || media_type.contains('=') {
            return Err(format!("structure '{}' has no media type", structure.trim()));
        }

        for field in parts {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| format!("field '{}' has no value", field))?;
            let value = value.trim();
            if key.trim().is_empty() || value.is_empty() {
                return Err(format!("field '{}' is incomplete", field));
            }
            if let Some(cast) = value.strip_prefix('(').and_then(|v| v.split_once(')')) {
                let ty = cast.0.trim();
                if !CAPS_TYPES.contains(&ty) {
                    return Err(format!("field '{}' has unsupported type '{}'", key.trim(), ty));
                }
            }
        }
    }
    Ok(())
}

fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth -= 1,
            _ if c == sep && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
        if depth < 0 {
            return Err("unbalanced brackets".to_string());
        }
    }

    if depth != 0 || in_quotes {
        return Err("unterminated group".to_string());
    }
    parts.push(&input[start..]);
    Ok(parts)
}
