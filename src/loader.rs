// 📂 Ingestion Adapter - CSV / JSON files → typed rows
//
// Thin collaborator for the binaries. Cells are coerced to the shape their
// column declares; anything that does not fit is left absent so the engine
// reports it instead of the loader rejecting the file.

use crate::entities::{DataBundle, EntityKind, FieldShape};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::path::Path;

// ============================================================================
// CELL COERCION
// ============================================================================

fn split_list(cell: &str) -> Vec<&str> {
    cell.split(|c| c == ',' || c == ';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_number(text: &str) -> Option<Value> {
    let value: f64 = text.trim().parse().ok()?;
    Number::from_f64(value).map(Value::Number)
}

/// JSON array form (`["a", "b"]`, `[1, 2]`) if the cell holds one
fn json_array(cell: &str) -> Option<Vec<Value>> {
    if !cell.starts_with('[') {
        return None;
    }
    match serde_json::from_str(cell) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Coerce one raw cell; `None` means the column is absent on this row
pub fn coerce_cell(cell: &str, shape: FieldShape) -> Option<Value> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    match shape {
        FieldShape::Text => Some(Value::String(cell.to_string())),
        FieldShape::Number => parse_number(cell),
        FieldShape::Structured => Some(Value::String(cell.to_string())),
        FieldShape::TextList => {
            let items = match json_array(cell) {
                Some(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => Value::String(text),
                        other => Value::String(other.to_string()),
                    })
                    .collect(),
                None => split_list(cell)
                    .into_iter()
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            };
            Some(Value::Array(items))
        }
        FieldShape::NumberList => {
            // One bad item drops the whole list
            let items: Option<Vec<Value>> = match json_array(cell) {
                Some(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::Number(n) => Some(Value::Number(n)),
                        Value::String(text) => parse_number(&text),
                        _ => None,
                    })
                    .collect(),
                None => split_list(cell).into_iter().map(parse_number).collect(),
            };
            items.map(Value::Array)
        }
    }
}

// ============================================================================
// LOADERS
// ============================================================================

/// Load rows of `kind` from a CSV file with a header row
pub fn load_csv<T: DeserializeOwned>(path: &Path, kind: EntityKind) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    read_csv_rows(&mut rdr, &headers, kind)
}

fn read_csv_rows<R: std::io::Read, T: DeserializeOwned>(
    rdr: &mut csv::Reader<R>,
    headers: &csv::StringRecord,
    kind: EntityKind,
) -> Result<Vec<T>> {
    let fields = kind.fields();
    let mut rows = Vec::new();

    for (index, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", index + 1))?;

        let mut object = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let header = header.trim();
            // Unknown columns are ignored
            let Some((name, shape)) = fields.iter().find(|(name, _)| *name == header) else {
                continue;
            };
            if let Some(value) = coerce_cell(cell, *shape) {
                object.insert(name.to_string(), value);
            }
        }

        let row = serde_json::from_value(Value::Object(object))
            .with_context(|| format!("Failed to build {} row {}", kind, index + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Load rows of `kind` from a JSON array file
pub fn load_json<T: DeserializeOwned>(path: &Path, kind: EntityKind) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {} JSON", kind))
}

/// Load by file extension (`.csv` or `.json`)
pub fn load_rows<T: DeserializeOwned>(path: &Path, kind: EntityKind) -> Result<Vec<T>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => load_csv(path, kind),
        Some("json") => load_json(path, kind),
        _ => Err(anyhow!(
            "Unsupported file format: {:?}. Please provide a CSV or JSON file.",
            path
        )),
    }
}

/// Build a bundle from whichever files were given; missing ones stay empty
pub fn load_bundle(
    clients: Option<&Path>,
    workers: Option<&Path>,
    tasks: Option<&Path>,
) -> Result<DataBundle> {
    let mut bundle = DataBundle::default();

    if let Some(path) = clients {
        bundle.clients = load_rows(path, EntityKind::Clients)?;
        tracing::info!(rows = bundle.clients.len(), "loaded clients from {:?}", path);
    }
    if let Some(path) = workers {
        bundle.workers = load_rows(path, EntityKind::Workers)?;
        tracing::info!(rows = bundle.workers.len(), "loaded workers from {:?}", path);
    }
    if let Some(path) = tasks {
        bundle.tasks = load_rows(path, EntityKind::Tasks)?;
        tracing::info!(rows = bundle.tasks.len(), "loaded tasks from {:?}", path);
    }

    Ok(bundle)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Attributes, Client, Task, Worker};
    use serde_json::json;
    use std::io::Write;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_coerce_lists() {
        assert_eq!(coerce_cell("[1, 2, 3]", FieldShape::NumberList), Some(json!([1, 2, 3])));
        assert_eq!(coerce_cell("1; 2", FieldShape::NumberList), Some(json!([1.0, 2.0])));
        assert_eq!(coerce_cell("1,x", FieldShape::NumberList), None);
        assert_eq!(
            coerce_cell("python, sql", FieldShape::TextList),
            Some(json!(["python", "sql"]))
        );
        assert_eq!(coerce_cell("[\"T1\",\"T2\"]", FieldShape::TextList), Some(json!(["T1", "T2"])));
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce_cell("  ", FieldShape::Text), None);
        assert_eq!(coerce_cell("abc", FieldShape::Number), None);
        assert_eq!(coerce_cell("2.5", FieldShape::Number), Some(json!(2.5)));
        assert_eq!(coerce_cell("{bad", FieldShape::Structured), Some(json!("{bad")));
    }

    #[test]
    fn test_load_clients_csv() {
        let file = write_file(
            ".csv",
            "ClientID,ClientName,PriorityLevel,RequestedTaskIDs,GroupTag,AttributesJSON,Notes\n\
             C1,Acme,3,\"T1,T2\",GroupA,\"{\"\"budget\"\": 5}\",vip\n\
             C2,Beta,high,,GroupB,,\n",
        );

        let clients: Vec<Client> = load_rows(file.path(), EntityKind::Clients).unwrap();

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].priority_level, Some(3.0));
        assert_eq!(
            clients[0].requested_task_ids,
            Some(vec!["T1".to_string(), "T2".to_string()])
        );
        assert!(matches!(&clients[0].attributes_json, Some(Attributes::Text(t)) if t.contains("budget")));
        assert_eq!(clients[1].priority_level, None);
        assert_eq!(clients[1].requested_task_ids, None);
    }

    #[test]
    fn test_load_workers_csv_with_bad_slots() {
        let file = write_file(
            ".csv",
            "WorkerID,WorkerName,Skills,AvailableSlots,MaxLoadPerPhase,WorkerGroup,QualificationLevel\n\
             W1,Ana,\"python,sql\",\"[1,3]\",2,G,4\n\
             W2,Bo,welding,\"[1,\"\"x\"\"]\",1,G,2\n",
        );

        let workers: Vec<Worker> = load_rows(file.path(), EntityKind::Workers).unwrap();

        assert_eq!(workers[0].available_slots, Some(vec![1.0, 3.0]));
        assert_eq!(workers[1].available_slots, None);
        assert_eq!(workers[1].skills, Some(vec!["welding".to_string()]));
    }

    #[test]
    fn test_load_tasks_json() {
        let file = write_file(
            ".json",
            r#"[{"TaskID": "T1", "Duration": 2, "RequiredSkills": ["python"], "PreferredPhases": [1, 2], "MaxConcurrent": 1}]"#,
        );

        let tasks: Vec<Task> = load_rows(file.path(), EntityKind::Tasks).unwrap();

        assert_eq!(tasks[0].duration, Some(2.0));
        assert_eq!(tasks[0].task_name, None);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_file(".xlsx", "");
        let err = load_rows::<Task>(file.path(), EntityKind::Tasks).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_load_bundle_partial() {
        let file = write_file(".json", r#"[{"TaskID": "T1"}]"#);
        let bundle = load_bundle(None, None, Some(file.path())).unwrap();

        assert!(bundle.clients.is_empty());
        assert!(bundle.workers.is_empty());
        assert_eq!(bundle.tasks.len(), 1);
    }
}
