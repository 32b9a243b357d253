//! Use-before-execution analysis, run at a module's own execution step.
//!
//! An import is unsafe while the module that defines its binding has not yet
//! executed. Reading it on the top-level path fails immediately. Reading it
//! inside a function only fails if that function is called on the top-level
//! path, directly or through other functions, so unsafe functions are
//! propagated through the module's call sites with a growing explanation.
//!
//! Exported unsafe functions carry a [`Hazard`] on their export entry. An
//! importer executing later picks it up, as long as the hazard's root module
//! still has not executed.

use oxc_semantic::SymbolId;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::entries::{DEFAULT_LOCAL_NAME, Hazard};
use crate::error::{AnalysisError, Result};
use crate::exports::BindingName;
use crate::facts::{FunctionOwner, ReferenceContext};
use crate::host::ModuleHost;
use crate::issue::IssueKind;
use crate::record::{ModuleId, ModuleRecord, SourceModule};
use crate::span::SourceNode;

/// A function value that can be called by name within a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Callable {
    Binding(SymbolId),
    DefaultExport,
}

/// A callable that fails when called, and why.
#[derive(Debug, Clone)]
struct UnsafeCall {
    callable: Callable,
    name: String,
    /// Index of the import entry the failure traces back to.
    import: usize,
    hazard: Hazard,
}

#[derive(Debug)]
struct Finding {
    import: usize,
    node: SourceNode,
    message: String,
}

#[derive(Debug, Default)]
struct Outcome {
    findings: Vec<Finding>,
    /// Hazards to attach, by local export entry index.
    hazards: Vec<(usize, Hazard)>,
}

/// Check every import of `module` against the execution state of its target.
pub(crate) fn execute_module(host: &mut ModuleHost, module: ModuleId) -> Result<()> {
    let record = host.record(module);
    let Some(source) = record.as_source() else {
        return Ok(());
    };

    let mut outcome = Outcome::default();
    let seeds = seed_unsafe_calls(host, record, source, &mut outcome)?;
    propagate(record, source, seeds, &mut outcome);

    if outcome.findings.is_empty() && outcome.hazards.is_empty() {
        return Ok(());
    }
    debug!(
        module = %record.relative_path,
        findings = outcome.findings.len(),
        hazards = outcome.hazards.len(),
        "use before execution"
    );

    let source = host
        .record_mut(module)
        .as_source_mut()
        .ok_or_else(|| AnalysisError::Internal("executed module lost its source".into()))?;
    for finding in &outcome.findings {
        source.entries.import_entries[finding.import]
            .unsafe_uses
            .push(finding.node);
    }
    for (entry, hazard) in outcome.hazards {
        source.entries.local_export_entries[entry].hazards.push(hazard);
    }

    let issues: Vec<_> = outcome
        .findings
        .into_iter()
        .map(|finding| {
            let import = source.entries.import_entries[finding.import].clone();
            (finding, import)
        })
        .collect();
    for (finding, import) in issues {
        host.add_issue(
            module,
            IssueKind::UseBeforeExecution {
                import: Box::new(import),
            },
            Some(finding.node),
            finding.message,
        );
    }

    Ok(())
}

/// Report top-level reads of unsafe imports and collect the functions that
/// read them, plus imported functions that already carry a hazard.
fn seed_unsafe_calls(
    host: &ModuleHost,
    record: &ModuleRecord,
    source: &SourceModule,
    outcome: &mut Outcome,
) -> Result<Vec<UnsafeCall>> {
    let mut seeds = Vec::new();

    for (index, entry) in source.entries.import_entries.iter().enumerate() {
        let Some(Some(binding)) = source.environment.get(index) else {
            continue;
        };
        let (Some(symbol), target) = (entry.symbol, host.record(binding.module)) else {
            continue;
        };
        let Some(target_source) = target.as_source() else {
            continue;
        };
        let BindingName::Name(binding_name) = &binding.binding else {
            if !target.has_executed {
                seed_namespace_reads(record, source, target, index, symbol, outcome, &mut seeds);
            }
            continue;
        };

        if !target.has_executed && !target_source.facts.is_hoisted_function(binding_name) {
            for reference in source.facts.references_to(symbol) {
                match &reference.context {
                    ReferenceContext::TopLevel => outcome.findings.push(Finding {
                        import: index,
                        node: reference.node,
                        message: format!(
                            "Imported '{}' is used before '{}' has been evaluated.",
                            entry.local_name, target.relative_path
                        ),
                    }),
                    ReferenceContext::Function(owner) => {
                        let Some((callable, name)) = callable_of(owner) else {
                            continue;
                        };
                        let line = format!(
                            "calling '{name}' from '{}' uses imported '{}' before '{}' has been evaluated.",
                            record.relative_path, entry.local_name, target.relative_path
                        );
                        seeds.push(UnsafeCall {
                            callable,
                            name,
                            import: index,
                            hazard: Hazard {
                                root: binding.module,
                                chain: vec![line],
                            },
                        });
                    }
                    ReferenceContext::ReExport | ReferenceContext::ClassBody => {}
                }
            }
        }

        for export in target_source
            .entries
            .local_export_entries
            .iter()
            .filter(|export| export.local_name == *binding_name)
        {
            for hazard in &export.hazards {
                if host.record(hazard.root).has_executed {
                    continue;
                }
                let mut chain = vec![format!(
                    "calling '{}' from '{}' is calling '{}' exported from '{}'.",
                    entry.local_name, record.relative_path, entry.import_name, target.relative_path
                )];
                chain.extend(hazard.chain.iter().cloned());
                trace!(import = %entry.local_name, "imported function carries a hazard");
                seeds.push(UnsafeCall {
                    callable: Callable::Binding(symbol),
                    name: entry.local_name.clone(),
                    import: index,
                    hazard: Hazard {
                        root: hazard.root,
                        chain,
                    },
                });
            }
        }
    }

    Ok(seeds)
}

/// Reads of `ns.name` on a namespace import fail while `name` is still
/// uninitialized in the unexecuted target. The namespace object itself, and
/// its hoisted functions, are available.
fn seed_namespace_reads(
    record: &ModuleRecord,
    source: &SourceModule,
    target: &ModuleRecord,
    import: usize,
    symbol: SymbolId,
    outcome: &mut Outcome,
    seeds: &mut Vec<UnsafeCall>,
) {
    let Some(target_source) = target.as_source() else {
        return;
    };
    let entry = &source.entries.import_entries[import];
    for reference in source.facts.references_to(symbol) {
        let Some(member) = &reference.member else {
            continue;
        };
        let uninitialized = target_source
            .entries
            .local_export_entries
            .iter()
            .find(|export| export.export_name == *member)
            .is_some_and(|export| !target_source.facts.is_hoisted_function(&export.local_name));
        if !uninitialized {
            continue;
        }

        let read = format!("{}.{member}", entry.local_name);
        match &reference.context {
            ReferenceContext::TopLevel => outcome.findings.push(Finding {
                import,
                node: reference.node,
                message: format!(
                    "Imported '{read}' is used before '{}' has been evaluated.",
                    target.relative_path
                ),
            }),
            ReferenceContext::Function(owner) => {
                let Some((callable, name)) = callable_of(owner) else {
                    continue;
                };
                let line = format!(
                    "calling '{name}' from '{}' uses imported '{read}' before '{}' has been evaluated.",
                    record.relative_path, target.relative_path
                );
                seeds.push(UnsafeCall {
                    callable,
                    name,
                    import,
                    hazard: Hazard {
                        root: target.id,
                        chain: vec![line],
                    },
                });
            }
            ReferenceContext::ReExport | ReferenceContext::ClassBody => {}
        }
    }
}

fn callable_of(owner: &FunctionOwner) -> Option<(Callable, String)> {
    match owner {
        FunctionOwner::Binding { symbol, name } => Some((Callable::Binding(*symbol), name.clone())),
        FunctionOwner::DefaultExport => Some((Callable::DefaultExport, "default".to_string())),
        FunctionOwner::Anonymous => None,
    }
}

/// Follow unsafe callables through their call sites until the top-level path
/// is reached or no caller is left.
fn propagate(
    record: &ModuleRecord,
    source: &SourceModule,
    seeds: Vec<UnsafeCall>,
    outcome: &mut Outcome,
) {
    let mut queue: VecDeque<UnsafeCall> = seeds.into();
    let mut visited: FxHashSet<Callable> = FxHashSet::default();
    let mut reported: FxHashSet<(u32, u32)> = outcome
        .findings
        .iter()
        .map(|finding| finding.node.key())
        .collect();

    while let Some(call) = queue.pop_front() {
        if !visited.insert(call.callable.clone()) {
            continue;
        }

        for (index, export) in source.entries.local_export_entries.iter().enumerate() {
            let exported = match &call.callable {
                Callable::Binding(symbol) => export.symbol == Some(*symbol),
                Callable::DefaultExport => export.local_name == DEFAULT_LOCAL_NAME,
            };
            if exported {
                outcome.hazards.push((index, call.hazard.clone()));
            }
        }

        let Callable::Binding(symbol) = call.callable else {
            continue;
        };
        for reference in source.facts.references_to(symbol) {
            match &reference.context {
                ReferenceContext::TopLevel => {
                    if !reported.insert(reference.node.key()) {
                        continue;
                    }
                    let mut message =
                        format!("Calling '{}' will fail due to an import cycle:", call.name);
                    for line in &call.hazard.chain {
                        message.push_str("\n  ");
                        message.push_str(line);
                    }
                    outcome.findings.push(Finding {
                        import: call.import,
                        node: reference.node,
                        message,
                    });
                }
                ReferenceContext::Function(owner) => {
                    let Some((callable, name)) = callable_of(owner) else {
                        continue;
                    };
                    if visited.contains(&callable) {
                        continue;
                    }
                    let mut chain = vec![format!(
                        "calling '{name}' from '{}' calls '{}'.",
                        record.relative_path, call.name
                    )];
                    chain.extend(call.hazard.chain.iter().cloned());
                    queue.push_back(UnsafeCall {
                        callable,
                        name,
                        import: call.import,
                        hazard: Hazard {
                            root: call.hazard.root,
                            chain,
                        },
                    });
                }
                ReferenceContext::ReExport | ReferenceContext::ClassBody => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::host::{HostOptions, ModuleHost};
    use crate::issue::IssueKind;
    use crate::runtime::MemoryFileSystem;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn analyze(files: &[(&str, &str)], entry: &str) -> Vec<(String, String)> {
        let fs = files
            .iter()
            .fold(MemoryFileSystem::new(), |fs, (path, source)| fs.with_file(path, *source));
        let mut host = ModuleHost::with_file_system(
            Arc::new(fs),
            HostOptions {
                extensions: vec![".js".to_string()],
                working_directory: PathBuf::from("/app"),
            },
        );
        host.parse_entrypoint(Path::new(entry)).expect("entry readable");
        host.issues()
            .into_iter()
            .filter(|issue| matches!(issue.kind, IssueKind::UseBeforeExecution { .. }))
            .map(|issue| (issue.relative_path, issue.message))
            .collect()
    }

    #[test]
    fn top_level_read_of_unexecuted_import() {
        let issues = analyze(
            &[
                ("/app/a.js", "import { b } from './b.js';\nexport const a = 1;\nb;"),
                ("/app/b.js", "import { a } from './a.js';\nconsole.log(a);\nexport const b = 2;"),
            ],
            "/app/a.js",
        );
        assert_eq!(
            issues,
            vec![(
                "b.js".to_string(),
                "Imported 'a' is used before 'a.js' has been evaluated.".to_string()
            )]
        );
    }

    #[test]
    fn uncalled_function_is_safe_and_hoisted_functions_are_safe() {
        let issues = analyze(
            &[
                ("/app/a.js", "import './b.js';\nexport const a = 1;\nexport function f() {}"),
                (
                    "/app/b.js",
                    "import { a, f } from './a.js';\nfunction later() { return a; }\nf();\nexport { a };",
                ),
            ],
            "/app/a.js",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn call_chain_is_explained() {
        let issues = analyze(
            &[
                ("/app/a.js", "import './b.js';\nexport const a = 1;"),
                (
                    "/app/b.js",
                    "import { a } from './a.js';\nfunction f() { return a; }\nconst g = () => f();\ng();",
                ),
            ],
            "/app/a.js",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].1,
            "Calling 'g' will fail due to an import cycle:\n  \
             calling 'g' from 'b.js' calls 'f'.\n  \
             calling 'f' from 'b.js' uses imported 'a' before 'a.js' has been evaluated."
        );
    }

    #[test]
    fn exported_hazard_reaches_importer() {
        let issues = analyze(
            &[
                (
                    "/app/entry.js",
                    "import { callme } from './cycle.js';\nexport const unavailable = 1;\ncallme();",
                ),
                (
                    "/app/cycle.js",
                    "import { unavailable } from './entry.js';\nexport function callme() { return unavailable; }",
                ),
            ],
            "/app/entry.js",
        );
        assert_eq!(
            issues,
            vec![(
                "entry.js".to_string(),
                "Calling 'callme' will fail due to an import cycle:\n  \
                 calling 'callme' from 'entry.js' is calling 'callme' exported from 'cycle.js'.\n  \
                 calling 'callme' from 'cycle.js' uses imported 'unavailable' before 'entry.js' has been evaluated."
                    .to_string()
            )]
        );
    }

    #[test]
    fn class_methods_and_callbacks_are_not_on_the_top_level_path() {
        let issues = analyze(
            &[
                ("/app/a.js", "import './b.js';\nexport const a = 1;"),
                (
                    "/app/b.js",
                    "import { a } from './a.js';\nclass C { m() { return a; } }\nnew C().m();\nsetTimeout(() => a);",
                ),
            ],
            "/app/a.js",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn iife_reads_are_top_level() {
        let issues = analyze(
            &[
                ("/app/a.js", "import './b.js';\nexport const a = 1;"),
                ("/app/b.js", "import { a } from './a.js';\n(() => { a; })();"),
            ],
            "/app/a.js",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].1,
            "Imported 'a' is used before 'a.js' has been evaluated."
        );
    }

    #[test]
    fn namespace_member_read_of_unexecuted_module() {
        let issues = analyze(
            &[
                ("/app/a.js", "import './b.js';\nexport const a = 1;\nexport function f() {}"),
                (
                    "/app/b.js",
                    "import * as ns from './a.js';\nconsole.log(ns.a);\nns.f();\nexport const all = ns;",
                ),
            ],
            "/app/a.js",
        );
        assert_eq!(
            issues,
            vec![(
                "b.js".to_string(),
                "Imported 'ns.a' is used before 'a.js' has been evaluated.".to_string()
            )]
        );
    }

    #[test]
    fn namespace_member_read_inside_called_function() {
        let issues = analyze(
            &[
                ("/app/a.js", "import './b.js';\nexport const a = 1;"),
                (
                    "/app/b.js",
                    "import * as ns from './a.js';\nfunction read() { return ns.a; }\nread();",
                ),
            ],
            "/app/a.js",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].1,
            "Calling 'read' will fail due to an import cycle:\n  \
             calling 'read' from 'b.js' uses imported 'ns.a' before 'a.js' has been evaluated."
        );
    }
}
