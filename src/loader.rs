//! Schema discovery, loading and dereferencing.
//!
//! Handles loading schemas from files, strings, and HTTP URLs, and inlining
//! `$ref` pointers so the transpiler sees a self-contained document.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ReleaseError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Report whether a readable regular file exists at `path`.
///
/// Never fails: permission problems, dangling links and missing files all
/// read as `false`.
pub fn exists(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => File::open(path).is_ok(),
        _ => false,
    }
}

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `ReleaseError::SchemaRead` if the file can't be read,
/// or `ReleaseError::SchemaParse` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, ReleaseError> {
    read_schema(path).map(|loaded| loaded.value)
}

/// A schema file as read from disk.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub path: PathBuf,
    /// File contents, byte for byte.
    pub source: String,
    pub value: Value,
}

fn read_schema(path: &Path) -> Result<LoadedSchema, ReleaseError> {
    let source = std::fs::read_to_string(path).map_err(|source| ReleaseError::SchemaRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_json::from_str(&source).map_err(|source| ReleaseError::SchemaParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedSchema {
        path: path.to_path_buf(),
        source,
        value,
    })
}

/// Load a schema from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default). Failures are
/// reported as the message of the underlying HTTP error.
#[cfg(feature = "remote")]
pub fn load_schema_url(url: &str) -> Result<Value, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())?;

    let response = client.get(url).send().map_err(|e| e.to_string())?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(|e| e.to_string())?;

    response.json().map_err(|e| e.to_string())
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Check a parsed document against the JSON Schema meta-schema.
pub fn check_schema(path: &Path, schema: &Value) -> Result<(), ReleaseError> {
    jsonschema::meta::validate(schema).map_err(|e| ReleaseError::SchemaInvalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load every configured schema location, resolved against `cwd`.
///
/// All locations are attempted. The output preserves input order. When more
/// than one location fails the failures are reported together.
pub fn load_schemas<P: AsRef<Path>>(
    locations: &[P],
    cwd: &Path,
) -> Result<Vec<LoadedSchema>, ReleaseError> {
    let mut schemas = Vec::with_capacity(locations.len());
    let mut failures = Vec::new();

    for location in locations {
        let path = cwd.join(location);
        tracing::debug!(path = %path.display(), "loading schema");
        let checked = read_schema(&path)
            .and_then(|loaded| check_schema(&path, &loaded.value).map(|_| loaded));
        match checked {
            Ok(schema) => schemas.push(schema),
            Err(e) => failures.push(e),
        }
    }

    match failures.len() {
        0 => Ok(schemas),
        1 => Err(failures.remove(0)),
        _ => Err(ReleaseError::SchemaLoad { failures }),
    }
}

/// Navigate a JSON Pointer fragment (e.g., "#/$defs/foo" or "#/properties/bar").
///
/// Returns the value at the given JSON Pointer path within the schema.
/// The fragment should start with '#' (e.g., "#/$defs/foo").
pub fn navigate_fragment(schema: &Value, fragment: &str) -> Result<Value, ReleaseError> {
    let pointer = fragment.trim_start_matches('#');
    if pointer.is_empty() || pointer == "/" {
        return Ok(schema.clone());
    }
    let pointer = if pointer.starts_with('/') {
        pointer.to_string()
    } else {
        format!("/{}", pointer)
    };

    // serde_json handles ~0/~1 unescaping and array indices
    schema
        .pointer(&pointer)
        .cloned()
        .ok_or_else(|| ReleaseError::Dereference {
            reference: fragment.to_string(),
            message: format!("fragment not found: {}", fragment),
        })
}

/// Identifier of the document passed to [`dereference`].
const ROOT_ID: &str = "<root>";

/// Where relative references inside a document resolve from.
#[derive(Debug, Clone)]
enum Base {
    Dir(PathBuf),
    #[cfg_attr(not(feature = "remote"), allow(dead_code))]
    Url(String),
}

/// A loaded document that internal `#/...` references resolve against.
#[derive(Debug)]
struct Document {
    id: String,
    root: Value,
    base: Base,
}

/// Return a copy of `schema` with its `$ref` pointers inlined.
///
/// Internal refs (`#/...`) resolve against the document that contains them;
/// relative file refs resolve against `base_dir` (or the referring file's
/// directory); `http(s)://` refs are fetched with the `remote` feature.
/// Keywords next to a `$ref` win over the referenced definition's keywords.
///
/// A reference that is already being expanded further up the tree (a
/// recursive type, including `$ref: "#"`) is left in place. Inside a
/// referenced document such a ref is rewritten to `<document>#<fragment>`, so
/// it never reads as a pointer into the root.
///
/// # Errors
///
/// Returns `ReleaseError::Dereference` for dangling pointers, unreadable or
/// unparsable referenced files, and failed fetches.
pub fn dereference(schema: &Value, base_dir: &Path) -> Result<Value, ReleaseError> {
    let doc = Document {
        id: ROOT_ID.to_string(),
        root: schema.clone(),
        base: Base::Dir(base_dir.to_path_buf()),
    };
    let mut resolved = schema.clone();
    let mut in_progress = vec![format!("{}#", doc.id)];
    dereference_inner(&mut resolved, &doc, &mut in_progress)?;
    Ok(resolved)
}

fn dereference_inner(
    schema: &mut Value,
    doc: &Document,
    in_progress: &mut Vec<String>,
) -> Result<(), ReleaseError> {
    let replacement = match schema {
        Value::Object(obj) => dereference_object(obj, doc, in_progress)?,
        Value::Array(items) => {
            for item in items {
                dereference_inner(item, doc, in_progress)?;
            }
            None
        }
        _ => None,
    };
    if let Some(value) = replacement {
        *schema = value;
    }
    Ok(())
}

/// Inline the `$ref` of `obj`, if any, after resolving its sibling keywords.
///
/// The expanded target is merged as-is: it was already resolved against its
/// own document. Returns a value that replaces `obj` outright when the target
/// is not an object and `obj` had nothing besides the `$ref`.
fn dereference_object(
    obj: &mut Map<String, Value>,
    doc: &Document,
    in_progress: &mut Vec<String>,
) -> Result<Option<Value>, ReleaseError> {
    let reference = obj.get("$ref").and_then(Value::as_str).map(String::from);

    for (key, value) in obj.iter_mut() {
        if key == "$ref" && reference.is_some() {
            continue;
        }
        dereference_inner(value, doc, in_progress)?;
    }

    let Some(ref_val) = reference else {
        return Ok(None);
    };

    let (file_part, fragment) = match ref_val.find('#') {
        Some(idx) => (&ref_val[..idx], &ref_val[idx..]),
        None => (ref_val.as_str(), "#"),
    };

    let external;
    let target_doc = if file_part.is_empty() {
        doc
    } else {
        external = load_document(file_part, &doc.base).map_err(|message| {
            ReleaseError::Dereference {
                reference: ref_val.clone(),
                message,
            }
        })?;
        &external
    };

    let visit_key = format!("{}{}", target_doc.id, fragment);
    if in_progress.contains(&visit_key) {
        tracing::debug!(reference = %ref_val, "leaving recursive reference in place");
        // Outside the root document the ref would be read against the wrong base
        if target_doc.id != ROOT_ID {
            obj.insert("$ref".to_string(), Value::String(visit_key));
        }
        return Ok(None);
    }

    let mut target = navigate_fragment(&target_doc.root, fragment).map_err(|e| match e {
        ReleaseError::Dereference { message, .. } => ReleaseError::Dereference {
            reference: ref_val.clone(),
            message,
        },
        other => other,
    })?;

    in_progress.push(visit_key);
    let expanded = dereference_inner(&mut target, target_doc, in_progress);
    in_progress.pop();
    expanded?;

    obj.remove("$ref");
    match target {
        Value::Object(target) => {
            for (k, v) in target {
                obj.entry(k).or_insert(v);
            }
            Ok(None)
        }
        // Boolean schemas and the like replace a bare $ref outright
        other if obj.is_empty() => Ok(Some(other)),
        _ => Ok(None),
    }
}

/// Load the document a non-fragment reference points at.
fn load_document(reference: &str, base: &Base) -> Result<Document, String> {
    if is_url(reference) {
        return load_remote_document(reference.to_string());
    }
    match base {
        Base::Dir(dir) => {
            let path = dir.join(reference);
            let root = load_schema(&path).map_err(|e| e.to_string())?;
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
            Ok(Document {
                id: canonical.display().to_string(),
                root,
                base: Base::Dir(dir),
            })
        }
        Base::Url(url) => load_remote_document(join_url(url, reference)),
    }
}

#[cfg(feature = "remote")]
fn load_remote_document(url: String) -> Result<Document, String> {
    tracing::debug!(url = %url, "fetching referenced schema");
    let root = load_schema_url(&url).map_err(|e| format!("failed to fetch {}: {}", url, e))?;
    Ok(Document {
        id: url.clone(),
        root,
        base: Base::Url(url),
    })
}

#[cfg(not(feature = "remote"))]
fn load_remote_document(url: String) -> Result<Document, String> {
    Err(format!(
        "cannot fetch {}: remote references require the `remote` feature",
        url
    ))
}

/// Resolve a relative reference against the URL of the referring document.
fn join_url(base: &str, reference: &str) -> String {
    match base.rfind('/') {
        Some(idx) if idx > base.find("://").map_or(0, |i| i + 2) => {
            format!("{}/{}", &base[..idx], reference.trim_start_matches("./"))
        }
        _ => format!("{}/{}", base.trim_end_matches('/'), reference.trim_start_matches("./")),
    }
}
