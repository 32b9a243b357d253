mod common;

use common::{Project, summarize};

fn project() -> Project {
    Project::new(&[
        (
            "entry.js",
            "import { x } from \"./broken.js\";\nimport { y } from \"./other.js\";\nexport const z = 1;\n",
        ),
        ("broken.js", "export const = ;\n"),
        ("other.js", "import { z } from \"./entry.js\";\nexport const y = 2;\n"),
    ])
}

#[test]
fn broken_module_does_not_stop_the_analysis() {
    let project = project();
    let host = project.analyze("entry.js");

    let summary: Vec<_> = summarize(&host.issues())
        .into_iter()
        .map(|issue| (issue.rule, issue.module, issue.node_type))
        .collect();
    assert_eq!(
        summary,
        [
            ("parse-error".to_string(), "broken.js".to_string(), "Program".to_string()),
            (
                "import-cycle".to_string(),
                "other.js".to_string(),
                "ImportDeclaration".to_string(),
            ),
        ]
    );
}

#[test]
fn broken_module_is_not_a_file_name() {
    let project = project();
    let host = project.analyze("entry.js");

    assert_eq!(project.file_names(&host), ["entry.js", "other.js"]);
    let broken = host.module_id(project.path("broken.js")).unwrap();
    assert!(host.record(broken).is_opaque());
    assert!(host.record(broken).has_executed);
}

#[test]
fn broken_entrypoint_reports_on_itself() {
    let project = Project::new(&[("entry.js", "import {\n")]);
    let host = project.analyze("entry.js");

    let issues = host.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule_id(), "parse-error");
    assert!(!issues[0].message.is_empty());
}
