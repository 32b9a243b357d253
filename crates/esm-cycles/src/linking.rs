//! Module linking (`Link` and `InnerModuleLinking`).
//!
//! A depth-first walk that assigns Tarjan indices on the way down and marks a
//! whole strongly connected component linked once its root is finished.

use tracing::{debug, trace};

use crate::entries::ImportName;
use crate::error::{AnalysisError, Result, ensure};
use crate::exports::{BindingName, ExportResolution, ResolvedBinding, get_module_namespace, resolve_export};
use crate::host::ModuleHost;
use crate::issue::IssueKind;
use crate::record::{ModuleId, Status};

const LINK: &str = "Link";
const INNER_MODULE_LINKING: &str = "InnerModuleLinking";

/// Link `module` and everything it transitively requests.
pub fn link(host: &mut ModuleHost, module: ModuleId) -> Result<()> {
    let status = host.record(module).status;
    ensure(
        !matches!(status, Status::Linking | Status::Evaluating),
        LINK,
        "2",
    )?;

    let mut stack = Vec::new();
    inner_module_linking(host, module, &mut stack, 0)?;

    let status = host.record(module).status;
    ensure(matches!(status, Status::Linked | Status::Evaluated), LINK, "6")?;
    ensure(stack.is_empty(), LINK, "7")?;
    Ok(())
}

fn inner_module_linking(
    host: &mut ModuleHost,
    module: ModuleId,
    stack: &mut Vec<ModuleId>,
    mut index: usize,
) -> Result<usize> {
    let record = host.record(module);
    if matches!(
        record.status,
        Status::Linking | Status::Linked | Status::Evaluated
    ) {
        return Ok(index);
    }
    ensure(record.status == Status::Unlinked, INNER_MODULE_LINKING, "3")?;

    let requests = host.requested_modules(module);

    let record = host.record_mut(module);
    record.status = Status::Linking;
    record.index = Some(index);
    record.ancestor_index = Some(index);
    index += 1;
    stack.push(module);

    for request in requests {
        let Some(required) = host.resolve_imported_module(module, &request.specifier)? else {
            continue;
        };
        index = inner_module_linking(host, required, stack, index)?;

        let required_record = host.record(required);
        ensure(
            matches!(
                required_record.status,
                Status::Linking | Status::Linked | Status::Evaluated
            ),
            INNER_MODULE_LINKING,
            "9.c.i",
        )?;

        if required_record.status == Status::Linking {
            ensure(stack.contains(&required), INNER_MODULE_LINKING, "9.c.ii")?;
            let required_ancestor = required_record.ancestor_index.ok_or_else(|| {
                AnalysisError::Internal("expected ancestor index to have been set by now".into())
            })?;
            let record = host.record_mut(module);
            record.ancestor_index = record.ancestor_index.map(|own| own.min(required_ancestor));
        }
    }

    initialize_environment(host, module)?;

    ensure(
        stack.iter().filter(|&&entry| entry == module).count() == 1,
        INNER_MODULE_LINKING,
        "11",
    )?;
    let (own_index, ancestor_index) = host.tarjan_indices(module)?;
    ensure(ancestor_index <= own_index, INNER_MODULE_LINKING, "12")?;

    if own_index == ancestor_index {
        let mut members = 0;
        while let Some(member) = stack.pop() {
            host.record_mut(member).status = Status::Linked;
            members += 1;
            if member == module {
                break;
            }
        }
        debug!(module = %host.record(module).relative_path, members, "linked module group");
    }

    Ok(index)
}

/// Resolve every indirect export and bind every import of `module`.
///
/// Resolution failures become issues on `module` and leave the affected
/// binding unset.
fn initialize_environment(host: &mut ModuleHost, module: ModuleId) -> Result<()> {
    let Some(source) = host.record(module).as_source() else {
        return Ok(());
    };

    let indirect: Vec<_> = source
        .entries
        .indirect_export_entries
        .iter()
        .filter_map(|entry| entry.export_name.clone().map(|name| (name, entry.node)))
        .collect();
    let imports: Vec<_> = source
        .entries
        .import_entries
        .iter()
        .map(|entry| (entry.module_request.clone(), entry.import_name.clone(), entry.node))
        .collect();

    for (export_name, node) in indirect {
        let message = match resolve_export(host, module, &export_name, &mut Vec::new())? {
            ExportResolution::Resolved(_) => continue,
            ExportResolution::NotFound => format!("Export of {export_name} could not be resolved."),
            ExportResolution::Ambiguous => format!("Export of {export_name} resolves ambiguously."),
        };
        host.add_issue(module, IssueKind::ExportError, Some(node), message);
    }

    let mut environment = Vec::with_capacity(imports.len());
    for (request, import_name, node) in imports {
        let Some(imported) = host.resolve_imported_module(module, &request)? else {
            environment.push(None);
            continue;
        };

        let name = match import_name {
            ImportName::Namespace => {
                get_module_namespace(host, imported)?;
                environment.push(Some(ResolvedBinding {
                    module: imported,
                    binding: BindingName::Namespace,
                }));
                continue;
            }
            ImportName::Name(name) => name,
        };

        let message = match resolve_export(host, imported, &name, &mut Vec::new())? {
            ExportResolution::Resolved(resolution) => {
                if resolution.binding == BindingName::Namespace {
                    get_module_namespace(host, resolution.module)?;
                }
                trace!(
                    module = %host.record(module).relative_path,
                    import = %name,
                    target = %host.record(resolution.module).relative_path,
                    "bound import"
                );
                environment.push(Some(resolution));
                continue;
            }
            ExportResolution::NotFound => format!(
                "Import of {name} could not be resolved by {}.",
                host.record(imported).relative_path
            ),
            ExportResolution::Ambiguous => format!("Import of {name} resolves ambiguously."),
        };
        environment.push(None);
        host.add_issue(
            module,
            IssueKind::ImportError { specifier: request },
            Some(node),
            message,
        );
    }

    if let Some(source) = host.record_mut(module).as_source_mut() {
        source.environment = environment;
    }
    Ok(())
}
