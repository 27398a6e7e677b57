//! Integration tests for the verify and prepare lifecycle.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use schema_release::{
    CompilerOptions, Language, Languages, Plugin, PluginConfig, ReleaseContext, ReleaseError,
    SemanticReleaseError, TranspileError, Transpiler, TsCompiler,
};
use serde_json::Value;
use tempfile::TempDir;

const FOO_BAR: &str = r##"{
    "title": "Foo Bar",
    "type": "object",
    "properties": {
        "id": { "type": "string" },
        "status": { "$ref": "#/$defs/status" }
    },
    "required": ["id"],
    "$defs": {
        "status": { "type": "string", "enum": ["open", "closed"] }
    }
}"##;

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn context(dir: &TempDir, version: &str) -> ReleaseContext {
    ReleaseContext::new().with_version(version).with_cwd(dir.path())
}

/// Every file under `root`, relative and sorted.
fn list_files(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}

fn verified(config: &PluginConfig, ctx: &ReleaseContext) -> Plugin {
    let mut plugin = Plugin::new();
    assert!(plugin.verify_conditions(config, ctx).unwrap());
    plugin
}

mod verify_conditions {
    use super::*;

    #[test]
    fn missing_location_fails() {
        let dir = TempDir::new().unwrap();
        let mut plugin = Plugin::new();
        let result = plugin.verify_conditions(&PluginConfig::default(), &context(&dir, "1.0.0"));

        let err = result.unwrap_err();
        assert!(matches!(err, ReleaseError::MissingSchemaLocation));
        assert_eq!(err.to_string(), "You must provide a schema location");
        assert!(!plugin.is_verified());
    }

    #[test]
    fn blank_location_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let mut plugin = Plugin::new();
        let result = plugin.verify_conditions(&PluginConfig::new("  "), &context(&dir, "1.0.0"));
        assert!(matches!(result, Err(ReleaseError::MissingSchemaLocation)));
    }

    #[test]
    fn nonexistent_path_fails() {
        let dir = TempDir::new().unwrap();
        let mut plugin = Plugin::new();
        let result = plugin.verify_conditions(
            &PluginConfig::new("missing.json"),
            &context(&dir, "1.0.0"),
        );

        match result {
            Err(ReleaseError::SchemaNotFound { paths }) => {
                assert_eq!(paths, vec![dir.path().join("missing.json")]);
            }
            other => panic!("expected SchemaNotFound, got {:?}", other),
        }
    }

    #[test]
    fn directory_is_not_a_schema() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("schemas")).unwrap();
        let mut plugin = Plugin::new();
        let result =
            plugin.verify_conditions(&PluginConfig::new("schemas"), &context(&dir, "1.0.0"));
        assert!(matches!(result, Err(ReleaseError::SchemaNotFound { .. })));
    }

    #[test]
    fn existing_path_succeeds() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let plugin = verified(&PluginConfig::new("schema.json"), &context(&dir, "1.0.0"));

        assert!(plugin.is_verified());
        assert_eq!(
            plugin.verification().unwrap().schema_paths(),
            &[dir.path().join("schema.json")]
        );
    }

    #[test]
    fn one_missing_path_in_a_list_fails() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "a.json", FOO_BAR);
        let config = PluginConfig::new(vec!["a.json".to_string(), "b.json".to_string()]);

        let mut plugin = Plugin::new();
        match plugin.verify_conditions(&config, &context(&dir, "1.0.0")) {
            Err(ReleaseError::SchemaNotFound { paths }) => {
                assert_eq!(paths, vec![dir.path().join("b.json")]);
            }
            other => panic!("expected SchemaNotFound, got {:?}", other),
        }
    }

    #[test]
    fn verify_does_not_read_schema_content() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", "not json at all");
        verified(&PluginConfig::new("schema.json"), &context(&dir, "1.0.0"));
    }
}

mod prepare_gates {
    use super::*;

    #[test]
    fn prepare_without_verify() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json").outpath("out");

        let plugin = Plugin::new();
        let err = plugin
            .prepare(&config, &context(&dir, "1.0.0"))
            .unwrap_err();
        assert!(matches!(err, ReleaseError::NotVerified));
        assert_eq!(err.code(), "ENOTVERIFIED");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn prepare_without_version() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json").outpath("out");
        let ctx = ReleaseContext::new().with_cwd(dir.path());
        let plugin = verified(&config, &ctx);

        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert!(matches!(err, ReleaseError::NoVersion));
        assert_eq!(err.code(), "ENOVERSION");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn blank_version_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json");
        let ctx = context(&dir, "   ");
        let plugin = verified(&config, &ctx);

        assert!(matches!(
            plugin.prepare(&config, &ctx),
            Err(ReleaseError::NoVersion)
        ));
    }

    #[test]
    fn untitled_schema_writes_nothing() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", r#"{"type": "object"}"#);
        let config = PluginConfig::new("schema.json").outpath("out");
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert!(matches!(err, ReleaseError::NoTitle { .. }));
        assert_eq!(err.code(), "ENOTITLE");
        assert!(list_files(&dir.path().join("out")).is_empty());
    }

    #[test]
    fn unresolvable_ref_writes_nothing() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "schema.json",
            r##"{"title": "Broken", "properties": {"a": {"$ref": "#/$defs/nope"}}}"##,
        );
        let config = PluginConfig::new("schema.json").outpath("out");
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert_eq!(err.code(), "EDEREFERENCE");
        assert!(list_files(&dir.path().join("out")).is_empty());
    }

    #[test]
    fn schema_deleted_after_verify() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json");
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        fs::remove_file(path).unwrap();
        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert_eq!(err.code(), "ESCHEMAREAD");
    }

    #[test]
    fn error_converts_to_release_error_object() {
        let shaped = SemanticReleaseError::from(&ReleaseError::NotVerified);
        assert_eq!(shaped.code, "ENOTVERIFIED");
        assert_eq!(shaped.message, "Not verified");
        assert!(shaped.semantic_release);
        assert!(!shaped.details.is_empty());
    }
}

mod prepare_artifacts {
    use super::*;

    #[test]
    fn go_only_writes_single_file() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json")
            .outpath("out")
            .languages(Languages::only(&[Language::Go]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        assert!(plugin.prepare(&config, &ctx).unwrap());

        let out = dir.path().join("out");
        assert_eq!(list_files(&out), vec!["foo_bar.go"]);
        let go = fs::read_to_string(out.join("foo_bar.go")).unwrap();
        assert!(go.starts_with("package foo_bar\n"));
        assert!(go.contains("const RawFooBar = \""));
        assert!(go.contains("type FooBar struct"));
    }

    #[test]
    fn no_languages_means_all_four() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json").outpath("out");
        let ctx = context(&dir, "3.1.4");
        let plugin = verified(&config, &ctx);

        let prepared = plugin.prepare_artifacts(&config, &ctx).unwrap();

        let out = dir.path().join("out");
        assert_eq!(
            list_files(&out),
            vec![
                "Cargo.toml",
                "foo_bar.go",
                "generated-typings.d.ts",
                "generated-typings.ts",
                "index.py",
                "src/lib.rs",
            ]
        );
        // Files come back in target order: TypeScript, Go, Rust, Python
        assert_eq!(prepared.files.first(), Some(&out.join("generated-typings.ts")));
        assert_eq!(prepared.files.last(), Some(&out.join("index.py")));

        let manifest = fs::read_to_string(out.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("version = \"3.1.4\""));
    }

    #[test]
    fn typescript_embeds_raw_schema() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json")
            .languages(Languages::only(&[Language::TypeScript]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();

        let module = fs::read_to_string(dir.path().join("generated-typings.ts")).unwrap();
        assert!(module.contains("export const fooBar = "));
        assert!(module.contains("export default fooBar;"));
        // The raw schema keeps its $ref
        assert!(module.contains("#/$defs/status"));

        let typings = fs::read_to_string(dir.path().join("generated-typings.d.ts")).unwrap();
        assert!(typings.contains("FooBar"));
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json").outpath("out");
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();
        let out = dir.path().join("out");
        let first: Vec<(String, Vec<u8>)> = list_files(&out)
            .into_iter()
            .map(|f| {
                let bytes = fs::read(out.join(&f)).unwrap();
                (f, bytes)
            })
            .collect();

        plugin.prepare(&config, &ctx).unwrap();
        let second: Vec<(String, Vec<u8>)> = list_files(&out)
            .into_iter()
            .map(|f| {
                let bytes = fs::read(out.join(&f)).unwrap();
                (f, bytes)
            })
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn malformed_manifest_is_replaced() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        write_temp_file(&dir, "out/Cargo.toml", "[package\nthis is = not toml");
        let config = PluginConfig::new("schema.json")
            .outpath("out")
            .languages(Languages::only(&[Language::Rust]));
        let ctx = context(&dir, "4.5.6");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();

        let manifest: toml::Table = fs::read_to_string(dir.path().join("out/Cargo.toml"))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(manifest["package"]["name"].as_str(), Some("foo_bar"));
        assert_eq!(manifest["package"]["version"].as_str(), Some("4.5.6"));
        assert!(manifest["dependencies"].get("serde").is_some());
    }

    #[test]
    fn existing_manifest_gets_new_version() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        write_temp_file(
            &dir,
            "out/Cargo.toml",
            "[package]\nname = \"my-types\"\nversion = \"0.1.0\"\n\n[dependencies]\nuuid = \"1\"\n",
        );
        let config = PluginConfig::new("schema.json")
            .outpath("out")
            .languages(Languages::only(&[Language::Rust]));
        let ctx = context(&dir, "0.2.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();

        let manifest: toml::Table = fs::read_to_string(dir.path().join("out/Cargo.toml"))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(manifest["package"]["name"].as_str(), Some("my-types"));
        assert_eq!(manifest["package"]["version"].as_str(), Some("0.2.0"));
        assert_eq!(manifest["dependencies"]["uuid"].as_str(), Some("1"));

        let lib = fs::read_to_string(dir.path().join("out/src/lib.rs")).unwrap();
        assert!(lib.contains("pub struct FooBar"));
    }

    #[test]
    fn multiple_schemas_use_first_for_naming() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        write_temp_file(
            &dir,
            "extra.json",
            r#"{"title": "Extra Thing", "type": "object", "properties": {"n": {"type": "number"}}}"#,
        );
        let config = PluginConfig::new(vec!["schema.json".to_string(), "extra.json".to_string()])
            .languages(Languages::only(&[Language::Go, Language::Python]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();

        assert!(!dir.path().join("extra_thing.go").exists());
        let go = fs::read_to_string(dir.path().join("foo_bar.go")).unwrap();
        assert!(go.contains("type FooBar struct"));
        assert!(go.contains("type ExtraThing struct"));
        let py = fs::read_to_string(dir.path().join("index.py")).unwrap();
        assert!(py.contains("class FooBar"));
        assert!(py.contains("class ExtraThing"));
    }

    #[test]
    fn external_file_refs_are_resolved() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "schemas/root.json",
            r#"{"title": "Order", "type": "object", "properties": {"item": {"$ref": "item.json"}}}"#,
        );
        write_temp_file(
            &dir,
            "schemas/item.json",
            r#"{"title": "Item", "type": "object", "properties": {"sku": {"type": "string"}}}"#,
        );
        let config = PluginConfig::new("schemas/root.json")
            .outpath("out")
            .languages(Languages::only(&[Language::Python]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();

        let py = fs::read_to_string(dir.path().join("out/index.py")).unwrap();
        assert!(py.contains("class Order"));
        assert!(py.contains("sku"));
    }

    #[test]
    fn relative_file_ref_passes_meta_check() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "root.json",
            r#"{"title": "Wrapper", "type": "object", "properties": {"inner": {"$ref": "./inner.json"}}}"#,
        );
        write_temp_file(&dir, "inner.json", r#"{"type": "integer"}"#);
        let config = PluginConfig::new("root.json")
            .outpath("out")
            .languages(Languages::only(&[Language::Go]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();
        let go = fs::read_to_string(dir.path().join("out/wrapper.go")).unwrap();
        assert!(go.contains("int64"));
    }

    #[test]
    fn meta_schema_violation_writes_nothing() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", r#"{"title": "Bad", "type": 12}"#);
        let config = PluginConfig::new("schema.json").outpath("out");
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert_eq!(err.code(), "ESCHEMAINVALID");
        assert!(list_files(&dir.path().join("out")).is_empty());
    }

    #[test]
    fn recursive_defs_type() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "list.json",
            r##"{
                "title": "List",
                "type": "object",
                "properties": { "head": { "$ref": "#/$defs/node" } },
                "$defs": {
                    "node": {
                        "type": "object",
                        "properties": {
                            "value": { "type": "string" },
                            "next": { "$ref": "#/$defs/node" }
                        }
                    }
                }
            }"##,
        );
        let config = PluginConfig::new("list.json").outpath("out");
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        let prepared = plugin.prepare_artifacts(&config, &ctx).unwrap();
        assert_eq!(prepared.files.len(), 6);
        let rs = fs::read_to_string(dir.path().join("out/src/lib.rs")).unwrap();
        assert!(rs.contains("pub struct List"));
    }

    #[test]
    fn external_recursive_type() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "common.json",
            r##"{
                "$defs": {
                    "node": {
                        "type": "object",
                        "properties": { "next": { "$ref": "#/$defs/node" } }
                    }
                }
            }"##,
        );
        write_temp_file(
            &dir,
            "root.json",
            r#"{"title": "Chain", "type": "object", "properties": {"head": {"$ref": "common.json#/$defs/node"}}}"#,
        );
        let config = PluginConfig::new("root.json")
            .outpath("out")
            .languages(Languages::only(&[Language::TypeScript]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();
        let typings = fs::read_to_string(dir.path().join("out/generated-typings.d.ts")).unwrap();
        assert!(typings.contains("export interface Chain {"));
        // The surviving self-reference is not mistaken for the root type
        assert!(!typings.contains("next?: Chain"));
    }

    #[test]
    fn prepare_loads_verified_schemas() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        write_temp_file(&dir, "other.json", r#"{"title": "Other Thing"}"#);
        let verified_config =
            PluginConfig::new("schema.json").languages(Languages::only(&[Language::Go]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&verified_config, &ctx);

        let changed = PluginConfig::new("other.json").languages(Languages::only(&[Language::Go]));
        plugin.prepare(&changed, &ctx).unwrap();

        assert!(dir.path().join("foo_bar.go").is_file());
        assert!(!dir.path().join("other_thing.go").exists());
    }

    #[test]
    fn absolute_outpath() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json")
            .outpath(elsewhere.path().join("gen"))
            .languages(Languages::only(&[Language::Python]));
        let ctx = context(&dir, "1.0.0");
        let plugin = verified(&config, &ctx);

        plugin.prepare(&config, &ctx).unwrap();
        assert!(elsewhere.path().join("gen/index.py").is_file());
    }

    #[test]
    fn plugins_are_independent() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json");
        let ctx = context(&dir, "1.0.0");

        let _first = verified(&config, &ctx);
        let second = Plugin::new();
        assert!(matches!(
            second.prepare(&config, &ctx),
            Err(ReleaseError::NotVerified)
        ));
    }
}

mod compile_variant {
    use super::*;

    struct FakeTsc {
        calls: std::rc::Rc<RefCell<Vec<CompilerOptions>>>,
        fail: bool,
    }

    impl TsCompiler for FakeTsc {
        fn compile(&self, options: &CompilerOptions, files: &[PathBuf]) -> Result<(), ReleaseError> {
            self.calls.borrow_mut().push(options.clone());
            assert!(files.iter().all(|f| f.is_file()));
            if self.fail {
                return Err(ReleaseError::Compile {
                    message: "src/index.ts(1,1): error TS1005".into(),
                });
            }
            fs::write(options.out_dir.join("index.js"), "\"use strict\";\n").unwrap();
            Ok(())
        }
    }

    fn fake(fail: bool) -> (FakeTsc, std::rc::Rc<RefCell<Vec<CompilerOptions>>>) {
        let calls = std::rc::Rc::new(RefCell::new(Vec::new()));
        (
            FakeTsc {
                calls: calls.clone(),
                fail,
            },
            calls,
        )
    }

    #[test]
    fn compiles_into_build() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json")
            .outpath("pkg")
            .compile(true)
            .languages(Languages::only(&[Language::TypeScript]));
        let ctx = context(&dir, "1.0.0");
        let (compiler, calls) = fake(false);
        let mut plugin = Plugin::new().with_compiler(compiler);
        plugin.verify_conditions(&config, &ctx).unwrap();

        plugin.prepare(&config, &ctx).unwrap();

        let pkg = dir.path().join("pkg");
        assert_eq!(
            list_files(&pkg),
            vec![
                "build/index.d.ts",
                "build/index.js",
                "src/index.ts",
                "src/schema.json"
            ]
        );
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(calls.borrow()[0].out_dir, pkg.join("build"));

        // Copied byte for byte, not re-serialized
        let copied = fs::read_to_string(pkg.join("src/schema.json")).unwrap();
        assert_eq!(copied, FOO_BAR);
    }

    #[test]
    fn compiler_failure_keeps_earlier_output() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json").compile(true);
        let ctx = context(&dir, "1.0.0");
        let (compiler, _) = fake(true);
        let mut plugin = Plugin::new().with_compiler(compiler);
        plugin.verify_conditions(&config, &ctx).unwrap();

        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert_eq!(err.code(), "ECOMPILE");
        assert!(dir.path().join("src/index.ts").is_file());
        // TypeScript runs first, so later targets never ran
        assert!(!dir.path().join("foo_bar.go").exists());
    }

    #[test]
    fn compiler_unused_without_compile_flag() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json")
            .languages(Languages::only(&[Language::TypeScript]));
        let ctx = context(&dir, "1.0.0");
        let (compiler, calls) = fake(false);
        let mut plugin = Plugin::new().with_compiler(compiler);
        plugin.verify_conditions(&config, &ctx).unwrap();

        plugin.prepare(&config, &ctx).unwrap();
        assert!(calls.borrow().is_empty());
        assert!(dir.path().join("generated-typings.ts").is_file());
    }
}

mod custom_transpiler {
    use super::*;

    struct RejectRust;

    impl Transpiler for RejectRust {
        fn render(&self, language: Language, schemas: &[Value]) -> Result<String, TranspileError> {
            match language {
                Language::Rust => Err(TranspileError::Backend("unsupported keyword".into())),
                other => Ok(format!("// {} for {} schemas\n", other, schemas.len())),
            }
        }
    }

    #[test]
    fn failure_stops_later_targets() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config = PluginConfig::new("schema.json");
        let ctx = context(&dir, "1.0.0");
        let mut plugin = Plugin::with_transpiler(RejectRust);
        plugin.verify_conditions(&config, &ctx).unwrap();

        let err = plugin.prepare(&config, &ctx).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Transpile {
                language: Language::Rust,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 4);

        // Earlier targets stay on disk, Python never ran
        assert!(dir.path().join("generated-typings.d.ts").is_file());
        assert!(dir.path().join("foo_bar.go").is_file());
        assert!(!dir.path().join("index.py").exists());
    }

    #[test]
    fn receives_dereferenced_schemas() {
        struct Capture(std::rc::Rc<RefCell<Vec<Value>>>);
        impl Transpiler for Capture {
            fn render(&self, _: Language, schemas: &[Value]) -> Result<String, TranspileError> {
                *self.0.borrow_mut() = schemas.to_vec();
                Ok(String::new())
            }
        }

        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", FOO_BAR);
        let config =
            PluginConfig::new("schema.json").languages(Languages::only(&[Language::Python]));
        let ctx = context(&dir, "1.0.0");
        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let mut plugin = Plugin::with_transpiler(Capture(seen.clone()));
        plugin.verify_conditions(&config, &ctx).unwrap();
        plugin.prepare(&config, &ctx).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0]["properties"]["status"]["enum"],
            serde_json::json!(["open", "closed"])
        );
        assert!(seen[0]["properties"]["status"].get("$ref").is_none());
        assert!(dir.path().join("index.py").is_file());
    }
}
