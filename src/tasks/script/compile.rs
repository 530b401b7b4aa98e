// src/tasks/script/compile.rs

use std::sync::Arc;

use anyhow::Result;
use swc::config::{
    Config, IsModule, JsMinifyOptions, JscConfig, ModuleConfig, Options, SourceMapsConfig,
};
use swc::{BoolOrDataConfig, try_with_handler};
use swc_common::{FileName, GLOBALS, Globals, SourceMap};
use swc_ecma_ast::EsVersion;
use swc_ecma_transforms_module::common_js;

use crate::types::ScriptTarget;

/// Output of [`compile`].
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub code: String,
    pub map: Option<String>,
}

/// Settings for one compile, taken from `[script]`.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub target: ScriptTarget,
    pub minify: bool,
    pub source_maps: bool,
}

/// Transpile (and optionally minify) a bundled script with swc.
///
/// `name` ends up in the source map's `sources`, next to the bundle text as
/// `sourcesContent`. The map therefore points into the bundle, not into the
/// individual module files.
pub fn compile(name: &str, code: String, opts: CompileOptions) -> Result<CompiledScript> {
    let options = Options {
        config: Config {
            jsc: JscConfig {
                target: Some(opts.target.to_es_version()),
                minify: opts.minify.then(|| JsMinifyOptions {
                    compress: BoolOrDataConfig::from_bool(true),
                    mangle: BoolOrDataConfig::from_bool(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
            minify: opts.minify.into(),
            is_module: Some(IsModule::Bool(false)),
            ..Default::default()
        },
        source_maps: opts.source_maps.then_some(SourceMapsConfig::Bool(true)),
        filename: name.to_string(),
        swcrc: false,
        ..Default::default()
    };

    process(name, code, &options)
}

/// Rewrite `import`/`export` into `require`/`exports` so an ES module can
/// sit in a CommonJS bundle. Syntax lowering is left to [`compile`].
pub fn to_commonjs(name: &str, code: String) -> Result<String> {
    let options = Options {
        config: Config {
            jsc: JscConfig {
                target: Some(EsVersion::latest()),
                ..Default::default()
            },
            module: Some(ModuleConfig::CommonJs(common_js::Config::default())),
            is_module: Some(IsModule::Bool(true)),
            ..Default::default()
        },
        filename: name.to_string(),
        swcrc: false,
        ..Default::default()
    };

    Ok(process(name, code, &options)?.code)
}

fn process(name: &str, code: String, options: &Options) -> Result<CompiledScript> {
    let cm = Arc::<SourceMap>::default();
    let compiler = swc::Compiler::new(cm.clone());

    let output = GLOBALS.set(&Globals::new(), || {
        try_with_handler(cm.clone(), Default::default(), |handler| {
            let fm = cm.new_source_file(FileName::Custom(name.to_string()).into(), code);
            compiler.process_js_file(fm, handler, options)
        })
    })?;

    Ok(CompiledScript {
        code: output.code,
        map: output.map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(minify: bool) -> CompileOptions {
        CompileOptions {
            target: ScriptTarget::Es5,
            minify,
            source_maps: true,
        }
    }

    #[test]
    fn lowers_modern_syntax_to_es5() {
        let out = compile(
            "app.js",
            "const add = (a, b) => a + b;\nconsole.log(add(1, 2));\n".to_string(),
            opts(false),
        )
        .unwrap();
        assert!(!out.code.contains("=>"));
        assert!(!out.code.contains("const "));
        assert!(out.map.is_some());
    }

    #[test]
    fn minified_output_is_smaller() {
        let src = "function greet(name) {\n  var message = 'hello ' + name;\n  return message;\n}\nconsole.log(greet('x'));\n";
        let out = compile("app.js", src.to_string(), opts(true)).unwrap();
        assert!(out.code.len() < src.len());
    }

    #[test]
    fn map_names_the_bundle_it_was_built_from() {
        let out = compile("app.bundle.js", "var a = 1;\n".to_string(), opts(false)).unwrap();
        let map: serde_json::Value = serde_json::from_str(&out.map.unwrap()).unwrap();
        assert_eq!(map["sources"][0], "app.bundle.js");
    }

    #[test]
    fn imports_and_exports_become_commonjs() {
        let out = to_commonjs(
            "app.js",
            "import greet from './greet';\nexport const shout = (n) => greet(n) + '!';\n"
                .to_string(),
        )
        .unwrap();
        assert!(out.contains("require(\"./greet\")"), "got: {out}");
        assert!(out.contains("exports"), "got: {out}");
        assert!(!out.contains("import "), "got: {out}");
        // Syntax lowering happens later, in `compile`.
        assert!(out.contains("=>"), "got: {out}");
    }

    #[test]
    fn syntax_error_is_an_error() {
        assert!(compile("bad.js", "var = ;".to_string(), opts(true)).is_err());
    }
}
