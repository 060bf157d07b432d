//! Import resolution: recursive, bottom-up splicing of `import "path"`
//! expressions into the AST they appear in.
//!
//! This is textual splicing, not linking: there is no module scoping, no
//! name mangling, and no cache between calls. Two imports that define the
//! same synonym name are not reconciled here -- the accumulator is flat and
//! conflict detection is left to elaboration downstream.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ast::SourceFile;
use crate::error::ResolveError;
use crate::lower::{self, Expr, Synonym};

/// Resolve every `Import` node reachable from `expr`, searching `lib_dirs`
/// in order for relative paths. `synonyms` is the accumulator seeded with
/// the root file's own synonym declarations; imported files' synonyms are
/// appended to it in the order their imports are encountered.
pub fn resolve_imports(
    lib_dirs: &[PathBuf],
    mut synonyms: Vec<Synonym>,
    expr: Expr,
) -> Result<(Vec<Synonym>, Expr), ResolveError> {
    let resolved = resolve_expr(lib_dirs, expr, &mut synonyms)?;
    Ok((synonyms, resolved))
}

fn resolve_expr(
    lib_dirs: &[PathBuf],
    expr: Expr,
    synonyms: &mut Vec<Synonym>,
) -> Result<Expr, ResolveError> {
    match expr {
        Expr::Import(_, path) => {
            let (file, source) = read_import(lib_dirs, &path)?;
            let parsed = crate::parse(&source);
            if !parsed.ok() {
                return Err(ResolveError::Parse {
                    path,
                    errors: parsed.errors().to_vec(),
                });
            }
            let root = SourceFile::cast(parsed.syntax()).unwrap_or_else(|| {
                // parsed.ok() guarantees a well-formed SOURCE_FILE root.
                unreachable!("parse succeeded but root is not a SOURCE_FILE")
            });
            let (imported_synonyms, imported_expr) =
                lower::lower_source_file(file, &source, &root);
            synonyms.extend(imported_synonyms);
            // Imports of imports: keep resolving inside the spliced body.
            resolve_expr(lib_dirs, imported_expr, synonyms)
        }
        Expr::Var(..) | Expr::Prim(..) => Ok(expr),
        Expr::App(pos, f, x) => Ok(Expr::App(
            pos,
            Box::new(resolve_expr(lib_dirs, *f, synonyms)?),
            Box::new(resolve_expr(lib_dirs, *x, synonyms)?),
        )),
        Expr::Lam(pos, bind, body) => Ok(Expr::Lam(
            pos,
            bind,
            Box::new(resolve_expr(lib_dirs, *body, synonyms)?),
        )),
        Expr::Let(pos, bind, value, body) => Ok(Expr::Let(
            pos,
            bind,
            Box::new(resolve_expr(lib_dirs, *value, synonyms)?),
            Box::new(resolve_expr(lib_dirs, *body, synonyms)?),
        )),
        Expr::AnnLam(pos, bind, ty, body) => Ok(Expr::AnnLam(
            pos,
            bind,
            ty,
            Box::new(resolve_expr(lib_dirs, *body, synonyms)?),
        )),
        Expr::AnnLet(pos, bind, ty, value, body) => Ok(Expr::AnnLet(
            pos,
            bind,
            ty,
            Box::new(resolve_expr(lib_dirs, *value, synonyms)?),
            Box::new(resolve_expr(lib_dirs, *body, synonyms)?),
        )),
        Expr::Ann(pos, value, ty) => Ok(Expr::Ann(
            pos,
            Box::new(resolve_expr(lib_dirs, *value, synonyms)?),
            ty,
        )),
    }
}

/// Absolute paths are read directly; relative paths search `lib_dirs` in
/// order for the first existing file.
fn read_import(lib_dirs: &[PathBuf], path: &str) -> Result<(Arc<str>, String), ResolveError> {
    let requested = Path::new(path);
    if requested.is_absolute() {
        let source = fs::read_to_string(requested).map_err(|e| ResolveError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        return Ok((Arc::from(path), source));
    }

    for dir in lib_dirs {
        let full = dir.join(requested);
        if full.is_file() {
            let source = fs::read_to_string(&full).map_err(|e| ResolveError::Io {
                path: full.display().to_string(),
                message: e.to_string(),
            })?;
            return Ok((Arc::from(full.to_string_lossy().into_owned()), source));
        }
    }

    Err(ResolveError::NotFound {
        path: path.to_string(),
        searched: lib_dirs.iter().map(|d| d.display().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::Prim;
    use std::sync::Arc as StdArc;

    fn lower_root(src: &str) -> (Vec<Synonym>, Expr) {
        let parsed = crate::parse(src);
        assert!(parsed.ok(), "unexpected parse errors: {:?}", parsed.errors());
        let root = SourceFile::cast(parsed.syntax()).expect("root is a SOURCE_FILE");
        lower::lower_source_file(StdArc::from("root.pr"), src, &root)
    }

    #[test]
    fn splices_relative_import() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("helper.pr"), "1 + 1").unwrap();

        let (synonyms, expr) = lower_root("import \"helper.pr\"");
        let (synonyms, resolved) =
            resolve_imports(&[dir.path().to_path_buf()], synonyms, expr).unwrap();

        assert!(synonyms.is_empty());
        assert!(matches!(resolved, Expr::App(..)));
    }

    #[test]
    fn missing_import_reports_searched_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let (synonyms, expr) = lower_root("import \"nope.pr\"");
        let err = resolve_imports(&[dir.path().to_path_buf()], synonyms, expr).unwrap_err();
        match err {
            ResolveError::NotFound { path, searched } => {
                assert_eq!(path, "nope.pr");
                assert_eq!(searched.len(), 1);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn accumulates_synonyms_from_recursive_imports() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pr"), "type Pair a b = { fst: a, snd: b }; {}").unwrap();
        fs::write(dir.path().join("a.pr"), "import \"b.pr\"").unwrap();

        let (synonyms, expr) = lower_root("import \"a.pr\"");
        let (synonyms, resolved) =
            resolve_imports(&[dir.path().to_path_buf()], synonyms, expr).unwrap();

        assert_eq!(synonyms.len(), 1);
        assert_eq!(synonyms[0].name, "Pair");
        assert!(matches!(resolved, Expr::Prim(_, Prim::RecordEmpty)));
    }
}
