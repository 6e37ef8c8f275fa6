use std::{env, fs::{self, File}, io::{BufReader, BufWriter, Write}, path::Path};

use serde_json::Value;


fn numbers(document: &Value, key: &str, name: &str) -> Vec<String> {
    let Some(values) = document.get(key) else {
        return Vec::new();
    };
    values.as_array()
        .unwrap_or_else(|| panic!("{}: \"{}\" is not an array", name, key))
        .iter()
        .map(|x| x.as_u64().unwrap_or_else(|| panic!("{}: non-integer in \"{}\"", name, key)).to_string())
        .collect()
}


fn emit_array(out: &mut String, ident: &str, ty: &str, values: &[String]) {
    *out += format!("pub static {}: [{}; {}] = [{}];\n", ident, ty, values.len(), values.join(", ")).as_str();
}


fn main() {
    println!("cargo::rerun-if-changed=grammars");
    let out_dir = env::var("OUT_DIR").unwrap();

    let mut generated = "use crate::table::TableData;\n\n".to_string();

    // Every grammars/<name>.json becomes <NAME>_* statics plus a <NAME>
    // TableData pointing at them
    let mut paths: Vec<_> = match fs::read_dir("grammars") {
        Ok(dir) => dir.filter_map(|e| e.ok()).map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|x| x == "json"))
            .collect(),
        Err(_) => {
            println!("cargo::warning=No grammars directory, no tables embedded");
            Vec::new()
        }
    };
    paths.sort();

    for path in paths {
        let name = path.file_stem().unwrap().to_string_lossy().to_string();
        let ident = name.replace('-', "_").to_uppercase();

        let reader = BufReader::new(File::open(&path).expect("Could not open grammar table!!"));
        let document: Value = serde_json::from_reader(reader)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));

        if document.get("nested").is_some() {
            // Nested grammars need owned tables, load those with from_json
            println!("cargo::warning={}: nested grammars are not embedded", name);
        }

        let start = document["start"].as_u64().expect("Grammar table without start state");
        emit_array(&mut generated, &format!("{}_STATES", ident), "u32", &numbers(&document, "states", &name));
        emit_array(&mut generated, &format!("{}_ACTIONS", ident), "u16", &numbers(&document, "actions", &name));
        emit_array(&mut generated, &format!("{}_GOTOS", ident), "u16", &numbers(&document, "gotos", &name));
        emit_array(&mut generated, &format!("{}_SPECIALIZATIONS", ident), "u16",
            &numbers(&document, "specializations", &name));

        let terms: Vec<String> = match document.get("terms").and_then(Value::as_array) {
            Some(terms) => terms.iter().map(|t| format!("{:?}", t.as_str().unwrap_or_default())).collect(),
            None => Vec::new(),
        };
        emit_array(&mut generated, &format!("{}_TERMS", ident), "&str", &terms);

        generated += format!(r#"
pub static {0}: TableData<'static> = TableData {{
    start: {1},
    states: &{0}_STATES,
    actions: &{0}_ACTIONS,
    gotos: &{0}_GOTOS,
    specializations: &{0}_SPECIALIZATIONS,
}};

"#, ident, start).as_str();
    }

    let f = File::create(Path::new(&out_dir).join("embedded_tables.rs"))
        .expect("Could not open output embedded_tables.rs!!");
    let mut writer = BufWriter::new(f);
    writer.write_all(generated.as_bytes())
        .expect("Could not write embedded_tables.rs!!");
    writer.flush().expect("Could not write embedded_tables.rs!!");
}
