//! Module evaluation (`Evaluate` and `InnerModuleEvaluation`).
//!
//! Evaluation mirrors linking but keeps a second stack of the modules whose
//! body is still pending. Re-entering a module on that stack is an import
//! cycle; reaching a module's own execution step is where premature uses of
//! its imports are detected.

use tracing::debug;

use crate::error::{AnalysisError, Result, ensure};
use crate::host::ModuleHost;
use crate::issue::{CycleFrame, IssueKind};
use crate::record::{ModuleId, Status};
use crate::span::SourceNode;
use crate::usage::execute_module;

const EVALUATE: &str = "Evaluate";
const INNER_MODULE_EVALUATION: &str = "InnerModuleEvaluation";

/// Evaluate a linked `module` and everything it transitively requests.
pub fn evaluate(host: &mut ModuleHost, module: ModuleId) -> Result<()> {
    let status = host.record(module).status;
    ensure(matches!(status, Status::Linked | Status::Evaluated), EVALUATE, "2")?;

    let mut stack = Vec::new();
    let mut execute_stack = Vec::new();
    inner_module_evaluation(host, module, &mut stack, &mut execute_stack, 0)?;

    ensure(host.record(module).status == Status::Evaluated, EVALUATE, "6")?;
    ensure(stack.is_empty(), EVALUATE, "7")?;
    ensure(execute_stack.is_empty(), EVALUATE, "7.x.1")?;
    Ok(())
}

fn inner_module_evaluation(
    host: &mut ModuleHost,
    module: ModuleId,
    stack: &mut Vec<ModuleId>,
    execute_stack: &mut Vec<ModuleId>,
    mut index: usize,
) -> Result<usize> {
    let record = host.record(module);
    if matches!(record.status, Status::Evaluating | Status::Evaluated) {
        return Ok(index);
    }
    ensure(record.status == Status::Linked, INNER_MODULE_EVALUATION, "4")?;

    let requests = host.requested_modules(module);

    let record = host.record_mut(module);
    record.status = Status::Evaluating;
    record.index = Some(index);
    record.ancestor_index = Some(index);
    index += 1;
    stack.push(module);
    execute_stack.push(module);

    for request in requests {
        let Some(required) = host.resolve_imported_module(module, &request.specifier)? else {
            continue;
        };
        index = inner_module_evaluation(host, required, stack, execute_stack, index)?;

        let required_status = host.record(required).status;
        ensure(
            matches!(required_status, Status::Evaluating | Status::Evaluated),
            INNER_MODULE_EVALUATION,
            "10.d.i",
        )?;

        if required_status == Status::Evaluating {
            ensure(stack.contains(&required), INNER_MODULE_EVALUATION, "10.d.ii")?;
            maybe_report_import_cycle(host, module, execute_stack, required, &request.declaration);

            let required_ancestor = host.record(required).ancestor_index.ok_or_else(|| {
                AnalysisError::Internal("expected ancestor index to have been set by now".into())
            })?;
            let record = host.record_mut(module);
            record.ancestor_index = record.ancestor_index.map(|own| own.min(required_ancestor));
        }
    }

    execute_module(host, module)?;
    ensure(
        execute_stack.last() == Some(&module),
        INNER_MODULE_EVALUATION,
        "11.x.1",
    )?;
    execute_stack.pop();
    host.record_mut(module).has_executed = true;

    ensure(
        stack.iter().filter(|&&entry| entry == module).count() == 1,
        INNER_MODULE_EVALUATION,
        "12",
    )?;
    let (own_index, ancestor_index) = host.tarjan_indices(module)?;
    ensure(ancestor_index <= own_index, INNER_MODULE_EVALUATION, "13")?;

    if own_index == ancestor_index {
        while let Some(member) = stack.pop() {
            host.record_mut(member).status = Status::Evaluated;
            if member == module {
                break;
            }
        }
    }

    Ok(index)
}

/// Report the cycle closed by `importer` requesting `required`.
///
/// Nothing is reported for leaves, for targets whose body already ran, or
/// for a declaration that was reported before.
fn maybe_report_import_cycle(
    host: &mut ModuleHost,
    importer: ModuleId,
    execute_stack: &[ModuleId],
    required: ModuleId,
    declaration: &SourceNode,
) {
    let target = host.record(required);
    if target.is_opaque() || target.has_executed {
        return;
    }
    let Some(start) = execute_stack.iter().position(|&entry| entry == required) else {
        return;
    };
    if !host.mark_cycle_reported(importer, declaration) {
        return;
    }

    let stack: Vec<CycleFrame> = execute_stack[start..]
        .iter()
        .chain(std::iter::once(&required))
        .map(|&id| {
            let record = host.record(id);
            CycleFrame {
                module: id,
                path: record.path.clone(),
                relative_path: record.relative_path.clone(),
            }
        })
        .collect();

    let message = format!(
        "Import cycle: {}",
        stack
            .iter()
            .map(|frame| frame.relative_path.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    debug!(module = %host.record(importer).relative_path, %message, "import cycle");

    host.add_issue(
        importer,
        IssueKind::ImportCycle { stack },
        Some(*declaration),
        message,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostOptions;
    use crate::linking::link;
    use crate::runtime::MemoryFileSystem;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn run(files: &[(&str, &str)], entry: &str) -> ModuleHost {
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
        let source = files
            .iter()
            .find(|(path, _)| *path == entry)
            .map(|(_, source)| *source)
            .expect("entry is a fixture");
        let id = host.parse_module(PathBuf::from(entry), source);
        link(&mut host, id).unwrap();
        evaluate(&mut host, id).unwrap();
        host
    }

    #[test]
    fn two_module_cycle() {
        let host = run(
            &[
                ("/app/a.js", "import { b } from './b.js';\nexport const a = 1;"),
                ("/app/b.js", "import { a } from './a.js';\nexport const b = 2;"),
            ],
            "/app/a.js",
        );

        let issues = host.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].relative_path, "b.js");
        assert_eq!(issues[0].message, "Import cycle: a.js -> b.js -> a.js");
        let IssueKind::ImportCycle { stack } = &issues[0].kind else {
            panic!("expected a cycle");
        };
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.first(), stack.last());

        for record in host.records() {
            assert_eq!(record.status, Status::Evaluated);
            assert!(record.has_executed);
        }
    }

    #[test]
    fn cycle_through_longer_path() {
        let host = run(
            &[
                ("/app/a.js", "import './b.js';"),
                ("/app/b.js", "import './c.js';"),
                ("/app/c.js", "import './a.js';"),
            ],
            "/app/a.js",
        );
        let issues = host.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Import cycle: a.js -> b.js -> c.js -> a.js");
    }

    #[test]
    fn namespace_reexport_through_cycle() {
        let host = run(
            &[
                (
                    "/app/a.js",
                    "import { b } from './b.js';\nexport * as ns from './c.js';\nexport const a = 1;",
                ),
                ("/app/b.js", "import { ns } from './a.js';\nexport const b = 2;"),
                ("/app/c.js", "export const c = 3;"),
            ],
            "/app/a.js",
        );

        let messages: Vec<_> = host.issues().into_iter().map(|issue| issue.message).collect();
        assert_eq!(messages, ["Import cycle: a.js -> b.js -> a.js"]);
        assert!(host.records().all(|record| record.status == Status::Evaluated));
    }

    #[test]
    fn acyclic_diamond_reports_nothing() {
        let host = run(
            &[
                ("/app/a.js", "import './b.js';\nimport './c.js';"),
                ("/app/b.js", "import './d.js';"),
                ("/app/c.js", "import './d.js';"),
                ("/app/d.js", "export const d = 1;"),
            ],
            "/app/a.js",
        );
        assert!(host.issues().is_empty());
    }

    #[test]
    fn repeated_edges_report_once_per_declaration() {
        let host = run(
            &[
                ("/app/a.js", "import { b } from './b.js';\nexport const a = 1;"),
                (
                    "/app/b.js",
                    "import { a } from './a.js';\nimport { a as again } from './a.js';\nexport const b = 1;",
                ),
            ],
            "/app/a.js",
        );
        assert_eq!(host.issues().len(), 1);
    }
}
