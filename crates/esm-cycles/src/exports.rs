//! Export resolution: `ResolveExport`, `GetExportedNames` and
//! `GetModuleNamespace` over the host's module graph.

use serde::Serialize;
use tracing::trace;

use crate::entries::ImportName;
use crate::error::{AnalysisError, Result, ensure};
use crate::host::ModuleHost;
use crate::record::ModuleId;

/// What an export ultimately refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingName {
    /// A binding declared in the module's own scope.
    Name(String),
    /// The module's namespace object.
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedBinding {
    pub module: ModuleId,
    pub binding: BindingName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResolution {
    Resolved(ResolvedBinding),
    NotFound,
    /// Two star exports provide the name through different bindings.
    Ambiguous,
}

/// Resolve `export_name` of `module` to the binding that defines it.
///
/// `resolve_set` holds the `(module, name)` pairs already on the current
/// resolution path. Revisiting one yields [`ExportResolution::NotFound`],
/// which is how circular `export *` graphs terminate.
pub fn resolve_export(
    host: &mut ModuleHost,
    module: ModuleId,
    export_name: &str,
    resolve_set: &mut Vec<(ModuleId, String)>,
) -> Result<ExportResolution> {
    let record = host.record(module);
    let Some(source) = record.as_source() else {
        return Ok(ExportResolution::Resolved(ResolvedBinding {
            module,
            binding: BindingName::Name(export_name.to_string()),
        }));
    };

    if resolve_set
        .iter()
        .any(|(visited, name)| *visited == module && name == export_name)
    {
        trace!(module = %record.relative_path, export_name, "circular export resolution");
        return Ok(ExportResolution::NotFound);
    }
    resolve_set.push((module, export_name.to_string()));

    let entries = &source.entries;
    if let Some(local) = entries
        .local_export_entries
        .iter()
        .find(|entry| entry.export_name == export_name)
    {
        return Ok(ExportResolution::Resolved(ResolvedBinding {
            module,
            binding: BindingName::Name(local.local_name.clone()),
        }));
    }

    if let Some(indirect) = entries
        .indirect_export_entries
        .iter()
        .find(|entry| entry.export_name.as_deref() == Some(export_name))
    {
        let request = indirect.module_request.clone();
        let import_name = indirect.import_name.clone();
        let Some(imported) = host.resolve_imported_module(module, &request)? else {
            return Ok(ExportResolution::NotFound);
        };
        return match import_name {
            ImportName::Namespace => Ok(ExportResolution::Resolved(ResolvedBinding {
                module: imported,
                binding: BindingName::Namespace,
            })),
            ImportName::Name(name) => resolve_export(host, imported, &name, resolve_set),
        };
    }

    // A default export is never provided by `export *`.
    if export_name == "default" {
        return Ok(ExportResolution::NotFound);
    }

    let star_requests: Vec<String> = entries
        .star_export_entries
        .iter()
        .map(|entry| entry.module_request.clone())
        .collect();

    let mut star_resolution: Option<ResolvedBinding> = None;
    let mut external_fallback: Option<ResolvedBinding> = None;
    for request in star_requests {
        let Some(imported) = host.resolve_imported_module(module, &request)? else {
            continue;
        };

        // External modules answer every name, so they only count when no
        // local module provides it.
        if host.record(imported).is_external() {
            if external_fallback.is_none() {
                external_fallback = Some(ResolvedBinding {
                    module: imported,
                    binding: BindingName::Name(export_name.to_string()),
                });
            }
            continue;
        }

        match resolve_export(host, imported, export_name, resolve_set)? {
            ExportResolution::Ambiguous => return Ok(ExportResolution::Ambiguous),
            ExportResolution::NotFound => {}
            ExportResolution::Resolved(resolution) => match &star_resolution {
                None => star_resolution = Some(resolution),
                Some(existing) if *existing != resolution => {
                    trace!(export_name, "star exports resolve ambiguously");
                    return Ok(ExportResolution::Ambiguous);
                }
                Some(_) => {}
            },
        }
    }

    Ok(star_resolution
        .or(external_fallback)
        .map_or(ExportResolution::NotFound, ExportResolution::Resolved))
}

/// Every name `module` exports, including names gathered through `export *`.
///
/// External and unparsed modules contribute no names.
pub fn get_exported_names(
    host: &mut ModuleHost,
    module: ModuleId,
    export_star_set: &mut Vec<ModuleId>,
) -> Result<Vec<String>> {
    if export_star_set.contains(&module) {
        return Ok(Vec::new());
    }
    export_star_set.push(module);

    let Some(source) = host.record(module).as_source() else {
        return Ok(Vec::new());
    };

    let entries = &source.entries;
    let mut names: Vec<String> = entries
        .local_export_entries
        .iter()
        .map(|entry| entry.export_name.clone())
        .chain(
            entries
                .indirect_export_entries
                .iter()
                .filter_map(|entry| entry.export_name.clone()),
        )
        .collect();
    let star_requests: Vec<String> = entries
        .star_export_entries
        .iter()
        .map(|entry| entry.module_request.clone())
        .collect();

    for request in star_requests {
        let Some(imported) = host.resolve_imported_module(module, &request)? else {
            continue;
        };
        for name in get_exported_names(host, imported, export_star_set)? {
            if name != "default" && !names.contains(&name) {
                names.push(name);
            }
        }
    }

    Ok(names)
}

/// The sorted names of `module`'s namespace object, created on first use.
///
/// Modules are discovered lazily, so a namespace re-exported through a cycle
/// can be requested before its module has been linked. The names depend only
/// on parsed entries, which every loaded record already has.
pub fn get_module_namespace(host: &mut ModuleHost, module: ModuleId) -> Result<Vec<String>> {
    let Some(source) = host.record(module).as_source() else {
        return Ok(Vec::new());
    };
    if let Some(namespace) = &source.namespace {
        return Ok(namespace.clone());
    }

    let mut names = Vec::new();
    for name in get_exported_names(host, module, &mut Vec::new())? {
        if let ExportResolution::Resolved(_) = resolve_export(host, module, &name, &mut Vec::new())? {
            names.push(name);
        }
    }
    names.sort();

    let source = host
        .record_mut(module)
        .as_source_mut()
        .ok_or_else(|| AnalysisError::Internal("namespace requested for a non-source module".into()))?;
    ensure(source.namespace.is_none(), "ModuleNamespaceCreate", "2")?;
    source.namespace = Some(names.clone());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostOptions;
    use crate::runtime::MemoryFileSystem;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn host(fs: MemoryFileSystem) -> ModuleHost {
        ModuleHost::with_file_system(
            Arc::new(fs),
            HostOptions {
                extensions: vec![".js".to_string()],
                working_directory: PathBuf::from("/app"),
            },
        )
    }

    fn load(host: &mut ModuleHost, path: &str) -> ModuleId {
        let source = host
            .file_system()
            .read_to_string(Path::new(path))
            .expect("fixture exists");
        host.parse_module(PathBuf::from(path), &source)
    }

    fn resolve(host: &mut ModuleHost, module: ModuleId, name: &str) -> ExportResolution {
        resolve_export(host, module, name, &mut Vec::new()).expect("resolution failed")
    }

    #[test]
    fn local_and_indirect_exports() {
        let fs = MemoryFileSystem::new()
            .with_file("/app/a.js", "export { b as c } from './b.js';\nexport const a = 1;")
            .with_file("/app/b.js", "const inner = 2;\nexport { inner as b };");
        let mut host = host(fs);
        let a = load(&mut host, "/app/a.js");

        assert!(matches!(
            resolve(&mut host, a, "a"),
            ExportResolution::Resolved(ResolvedBinding { module, binding: BindingName::Name(name) })
                if module == a && name == "a"
        ));

        let ExportResolution::Resolved(binding) = resolve(&mut host, a, "c") else {
            panic!("expected c to resolve");
        };
        assert_ne!(binding.module, a);
        assert_eq!(binding.binding, BindingName::Name("inner".into()));
        assert_eq!(resolve(&mut host, a, "missing"), ExportResolution::NotFound);
    }

    #[test]
    fn star_exports_skip_default_and_detect_ambiguity() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/app/index.js",
                "export * from './x.js';\nexport * from './y.js';\nexport * from './shared.js';",
            )
            .with_file("/app/x.js", "export const dup = 1;\nexport default 1;\nexport * from './shared.js';")
            .with_file("/app/y.js", "export const dup = 2;")
            .with_file("/app/shared.js", "export const same = 3;");
        let mut host = host(fs);
        let index = load(&mut host, "/app/index.js");

        assert_eq!(resolve(&mut host, index, "dup"), ExportResolution::Ambiguous);
        assert!(matches!(resolve(&mut host, index, "same"), ExportResolution::Resolved(_)));
        assert_eq!(resolve(&mut host, index, "default"), ExportResolution::NotFound);
    }

    #[test]
    fn circular_star_exports_terminate() {
        let fs = MemoryFileSystem::new()
            .with_file("/app/a.js", "export * from './b.js';")
            .with_file("/app/b.js", "export * from './a.js';\nexport const b = 1;");
        let mut host = host(fs);
        let a = load(&mut host, "/app/a.js");

        assert!(matches!(resolve(&mut host, a, "b"), ExportResolution::Resolved(_)));
        assert_eq!(resolve(&mut host, a, "nope"), ExportResolution::NotFound);
        assert_eq!(
            get_exported_names(&mut host, a, &mut Vec::new()).unwrap(),
            vec!["b".to_string()]
        );
    }

    #[test]
    fn external_modules_resolve_everything_as_fallback() {
        let fs = MemoryFileSystem::new()
            .with_file("/app/a.js", "export * from 'pkg';\nexport * from './b.js';")
            .with_file("/app/b.js", "export const b = 1;");
        let mut host = host(fs);
        let a = load(&mut host, "/app/a.js");

        let ExportResolution::Resolved(b) = resolve(&mut host, a, "b") else {
            panic!("expected b to resolve");
        };
        assert!(!host.record(b.module).is_external());

        let ExportResolution::Resolved(other) = resolve(&mut host, a, "other") else {
            panic!("expected external fallback");
        };
        assert!(host.record(other.module).is_external());
    }

    #[test]
    fn namespace_reexport_resolves_to_namespace() {
        let fs = MemoryFileSystem::new()
            .with_file("/app/a.js", "export * as ns from './b.js';")
            .with_file("/app/b.js", "export const b = 1;");
        let mut host = host(fs);
        let a = load(&mut host, "/app/a.js");

        let ExportResolution::Resolved(binding) = resolve(&mut host, a, "ns") else {
            panic!("expected ns to resolve");
        };
        assert_eq!(binding.binding, BindingName::Namespace);
    }
}
