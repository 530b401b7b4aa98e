// src/tasks/script/bundle.rs

//! CommonJS bundling.
//!
//! Starting from an entry file, every `require("...")` call is resolved and
//! pulled into a single script. Modules written with `import`/`export` are
//! lowered to CommonJS first, so both styles mix freely. Modules are numbered
//! in breadth-first discovery order starting at 1 (the entry) and wrapped in
//! a small loader prelude, so the same inputs always produce the same bytes.
//!
//! Relative and absolute specifiers resolve against the requiring module.
//! Bare ones (`require("lodash")`) are looked up in `node_modules`
//! directories from the requiring module's directory upwards.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use swc_common::{FileName, SourceMap};
use swc_ecma_ast::{CallExpr, Callee, EsVersion, Expr, Lit, ModuleItem, Program};
use swc_ecma_parser::lexer::Lexer;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::fs::FileSystem;

use super::compile::to_commonjs;

const PRELUDE_HEAD: &str = "(function () {\nvar modules = {\n";

const PRELUDE_TAIL: &str = r#"};
var cache = {};
function load(id) {
  if (cache[id]) {
    return cache[id].exports;
  }
  var entry = modules[id];
  var module = (cache[id] = { exports: {} });
  entry[0].call(
    module.exports,
    function (name) {
      var dep = entry[1][name];
      if (dep === undefined) {
        throw new Error("Cannot find module '" + name + "'");
      }
      return load(dep);
    },
    module,
    module.exports
  );
  return module.exports;
}
load(1);
})();
"#;

/// One module of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledModule {
    pub id: usize,
    pub path: PathBuf,
    /// Specifier as written in the source -> module id.
    pub deps: BTreeMap<String, usize>,
}

/// Result of bundling one entry.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub code: String,
    /// Modules in id order; `modules[0]` is the entry.
    pub modules: Vec<BundledModule>,
}

#[derive(Debug)]
pub struct Bundler<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> Bundler<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn bundle(&self, entry: &Path) -> Result<Bundle> {
        let mut ids: HashMap<PathBuf, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        let mut modules = Vec::new();
        let mut code = String::from(PRELUDE_HEAD);

        let entry = normalize(entry);
        ids.insert(entry.clone(), 1);
        queue.push_back(entry);

        while let Some(path) = queue.pop_front() {
            let id = ids[&path];
            let source = self
                .fs
                .read_to_string(&path)
                .with_context(|| format!("reading module {}", path.display()))?;
            let (source, specifiers) = load_module(&path, source)?;

            let mut deps = BTreeMap::new();
            for specifier in specifiers {
                let resolved = self.resolve(&path, &specifier)?;
                let next_id = ids.len() + 1;
                let dep_id = *ids.entry(resolved.clone()).or_insert_with(|| {
                    queue.push_back(resolved);
                    next_id
                });
                deps.insert(specifier, dep_id);
            }

            code.push_str(&format!(
                "{id}: [function (require, module, exports) {{\n{source}\n}}, {}],\n",
                serde_json::to_string(&deps)?
            ));
            modules.push(BundledModule { id, path, deps });
        }

        code.push_str(PRELUDE_TAIL);
        Ok(Bundle { code, modules })
    }

    fn resolve(&self, from: &Path, specifier: &str) -> Result<PathBuf> {
        let dir = from.parent().unwrap_or(Path::new("."));
        let found = if is_relative(specifier) {
            self.resolve_path(&normalize(&dir.join(specifier)))?
        } else if Path::new(specifier).is_absolute() {
            self.resolve_path(&normalize(Path::new(specifier)))?
        } else {
            self.resolve_package(dir, specifier)?
        };

        found.ok_or_else(|| {
            anyhow!(
                "cannot resolve '{specifier}' from {}",
                from.display()
            )
        })
    }

    /// `x`, then `x.js`, then `x` as a package directory.
    fn resolve_path(&self, base: &Path) -> Result<Option<PathBuf>> {
        if let Some(file) = self.resolve_file(base) {
            return Ok(Some(file));
        }
        self.resolve_dir(base)
    }

    fn resolve_file(&self, base: &Path) -> Option<PathBuf> {
        [base.to_path_buf(), PathBuf::from(format!("{}.js", base.display()))]
            .into_iter()
            .find(|c| self.fs.is_file(c))
    }

    /// `package.json` `main` (as a file or a directory with `index.js`),
    /// then `index.js`.
    fn resolve_dir(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if let Some(main) = self.package_main(dir)? {
            let main = normalize(&dir.join(main));
            let found = self.resolve_file(&main).or_else(|| {
                let index = main.join("index.js");
                self.fs.is_file(&index).then_some(index)
            });
            if found.is_some() {
                return Ok(found);
            }
        }
        let index = dir.join("index.js");
        Ok(self.fs.is_file(&index).then_some(index))
    }

    fn package_main(&self, dir: &Path) -> Result<Option<String>> {
        let manifest = dir.join("package.json");
        if !self.fs.is_file(&manifest) {
            return Ok(None);
        }
        let text = self.fs.read_to_string(&manifest)?;
        let package: PackageManifest = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", manifest.display()))?;
        Ok(package.main.filter(|m| !m.trim().is_empty()))
    }

    /// Walk up from `dir`, trying `node_modules/<specifier>` at every level.
    fn resolve_package(&self, dir: &Path, specifier: &str) -> Result<Option<PathBuf>> {
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor.ends_with("node_modules") {
                continue;
            }
            let base = normalize(&ancestor.join("node_modules").join(specifier));
            if let Some(found) = self.resolve_path(&base)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    main: Option<String>,
}

/// Module body ready for the bundle plus the specifiers it requires.
fn load_module(path: &Path, source: String) -> Result<(String, Vec<String>)> {
    let name = path.display().to_string();
    let program = parse(&name, &source)?;
    if !is_es_module(&program) {
        return Ok((source, requires(&program)));
    }

    let lowered = to_commonjs(&name, source)
        .with_context(|| format!("converting {name} to CommonJS"))?;
    let program = parse(&name, &lowered)?;
    let specifiers = requires(&program);
    Ok((lowered, specifiers))
}

fn parse(name: &str, source: &str) -> Result<Program> {
    let cm = SourceMap::default();
    let fm = cm.new_source_file(FileName::Custom(name.to_string()).into(), source.to_string());
    let lexer = Lexer::new(
        Syntax::Es(EsSyntax::default()),
        EsVersion::latest(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    parser
        .parse_program()
        .map_err(|e| anyhow!("{name}: syntax error: {}", e.kind().msg()))
}

fn is_es_module(program: &Program) -> bool {
    match program {
        Program::Module(module) => module
            .body
            .iter()
            .any(|item| matches!(item, ModuleItem::ModuleDecl(_))),
        Program::Script(_) => false,
    }
}

/// Specifiers of `require("...")` calls in source order, duplicates removed.
fn requires(program: &Program) -> Vec<String> {
    let mut collector = RequireCollector::default();
    program.visit_with(&mut collector);
    collector.specifiers
}

#[derive(Default)]
struct RequireCollector {
    specifiers: Vec<String>,
}

impl Visit for RequireCollector {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if let Some(specifier) = required_specifier(call) {
            if !self.specifiers.contains(&specifier) {
                self.specifiers.push(specifier);
            }
        }
        call.visit_children_with(self);
    }
}

fn required_specifier(call: &CallExpr) -> Option<String> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Ident(ident) = &**callee else {
        return None;
    };
    if &*ident.sym != "require" || call.args.len() != 1 {
        return None;
    }
    let arg = &call.args[0];
    match (&arg.spread, &*arg.expr) {
        (None, Expr::Lit(Lit::Str(s))) => Some(s.value.to_string()),
        _ => None,
    }
}

fn is_relative(specifier: &str) -> bool {
    matches!(specifier, "." | "..") || specifier.starts_with("./") || specifier.starts_with("../")
}

/// Lexically fold `.` and `..`; a leading `./` is kept so paths stay
/// comparable with what discovery produced.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {
                if out.as_os_str().is_empty() {
                    out.push(".");
                }
            }
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
