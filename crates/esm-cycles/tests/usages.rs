mod common;

use common::{Project, reported, summarize};
use esm_cycles::IssueKind;

const ENTRY: &str = r#"import { store } from "./module.js";

export const buildStore = () => ({ items: [] });

console.log(store);
"#;

#[test]
fn function_called_at_top_level() {
    let module = r#"import { buildStore } from "./entry.js";

function makeStore() {
  return buildStore();
}

export const store = makeStore();
"#;
    let project = Project::new(&[("entry.js", ENTRY), ("module.js", module)]);
    let host = project.analyze("entry.js");

    assert_eq!(
        summarize(&host.issues()),
        vec![
            reported(
                "import-cycle",
                "module.js",
                "ImportDeclaration",
                (1, 0),
                (1, 40),
                "Import cycle: entry.js -> module.js -> entry.js",
            ),
            reported(
                "use-before-execution",
                "module.js",
                "Identifier",
                (7, 21),
                (7, 30),
                "Calling 'makeStore' will fail due to an import cycle:\n  \
                 calling 'makeStore' from 'module.js' uses imported 'buildStore' before 'entry.js' has been evaluated.",
            ),
        ]
    );
}

#[test]
fn uncalled_function_is_safe() {
    let module = r#"import { buildStore } from "./entry.js";

export function makeStore() {
  return buildStore();
}

export const store = 1;
"#;
    let project = Project::new(&[("entry.js", ENTRY), ("module.js", module)]);
    let host = project.analyze("entry.js");

    let rules: Vec<_> = host.issues().iter().map(|issue| issue.rule_id()).collect();
    assert_eq!(rules, ["import-cycle"]);
}

#[test]
fn variable_initialized_from_import() {
    let module = r#"import { buildStore } from "./entry.js";

const created = buildStore();
export const store = created;
"#;
    let project = Project::new(&[("entry.js", ENTRY), ("module.js", module)]);
    let host = project.analyze("entry.js");

    let issues = host.issues();
    assert_eq!(
        summarize(&issues)[1],
        reported(
            "use-before-execution",
            "module.js",
            "Identifier",
            (3, 16),
            (3, 26),
            "Imported 'buildStore' is used before 'entry.js' has been evaluated.",
        )
    );

    let IssueKind::UseBeforeExecution { import } = &issues[1].kind else {
        panic!("expected a use before execution, got {:?}", issues[1].kind);
    };
    assert_eq!(import.local_name, "buildStore");
    assert_eq!(import.module_request, "./entry.js");
    assert_eq!(import.unsafe_uses.len(), 1);
}

const VARIOUS_ENTRY: &str = r#"import { makeCycle } from "./module";
import { callme } from "./functioncycle";

export const unavailable = 1;
callme();

export function foo() { return 1; }
export function bar() { return 2; }
export const indirect = 3;
"#;

const VARIOUS_MODULE: &str = r#"import { unavailable, foo, bar } from "./entry";
import { indirect } from "./indirectCycle";

let test = function() {
  return unavailable;
}
test();

function check() {
  return foo() + bar() + indirect;
}

const dotest = () => check();
dotest();

class Cls {
  static sa() { return check(); }
  a() { return check(); }
}

Cls.sa();
let cls = new Cls();
cls.a();

export function makeCycle() {}
"#;

const FUNCTION_CYCLE: &str = r#"import { unavailable } from "./entry";

export function callme() {
  return unavailable;
}
"#;

fn various() -> Project {
    Project::new(&[
        ("entry.js", VARIOUS_ENTRY),
        ("module.js", VARIOUS_MODULE),
        ("functioncycle.js", FUNCTION_CYCLE),
        ("indirectCycle.js", "export { indirect } from \"./indirect\";\n"),
        ("indirect.js", "export { indirect } from \"./entry\";\n"),
    ])
}

#[test]
fn various_usages() {
    let project = various();
    let host = project.analyze("entry.js");

    assert_eq!(
        summarize(&host.issues()),
        vec![
            reported(
                "use-before-execution",
                "entry.js",
                "Identifier",
                (5, 0),
                (5, 6),
                "Calling 'callme' will fail due to an import cycle:\n  \
                 calling 'callme' from 'entry.js' is calling 'callme' exported from 'functioncycle.js'.\n  \
                 calling 'callme' from 'functioncycle.js' uses imported 'unavailable' before 'entry.js' has been evaluated.",
            ),
            reported(
                "import-cycle",
                "functioncycle.js",
                "ImportDeclaration",
                (1, 0),
                (1, 38),
                "Import cycle: entry.js -> functioncycle.js -> entry.js",
            ),
            reported(
                "import-cycle",
                "indirect.js",
                "ExportNamedDeclaration",
                (1, 0),
                (1, 35),
                "Import cycle: entry.js -> module.js -> indirectCycle.js -> indirect.js -> entry.js",
            ),
            reported(
                "import-cycle",
                "module.js",
                "ImportDeclaration",
                (1, 0),
                (1, 48),
                "Import cycle: entry.js -> module.js -> entry.js",
            ),
            reported(
                "use-before-execution",
                "module.js",
                "Identifier",
                (7, 0),
                (7, 4),
                "Calling 'test' will fail due to an import cycle:\n  \
                 calling 'test' from 'module.js' uses imported 'unavailable' before 'entry.js' has been evaluated.",
            ),
            reported(
                "use-before-execution",
                "module.js",
                "Identifier",
                (14, 0),
                (14, 6),
                "Calling 'dotest' will fail due to an import cycle:\n  \
                 calling 'dotest' from 'module.js' calls 'check'.\n  \
                 calling 'check' from 'module.js' uses imported 'indirect' before 'entry.js' has been evaluated.",
            ),
        ]
    );
}

#[test]
fn various_usages_load_every_module() {
    let project = various();
    let host = project.analyze("entry.js");
    assert_eq!(
        project.file_names(&host),
        [
            "entry.js",
            "functioncycle.js",
            "indirect.js",
            "indirectCycle.js",
            "module.js",
        ]
    );
}

#[test]
fn hazard_is_stale_for_later_entrypoint() {
    let entry = r#"import { callme } from "./functioncycle";

export const unavailable = 1;
callme();
"#;
    let later = r#"import { callme } from "./functioncycle";

callme();
"#;
    let project = Project::new(&[
        ("entry.js", entry),
        ("functioncycle.js", FUNCTION_CYCLE),
        ("later.js", later),
    ]);
    let mut host = project.analyze("entry.js");
    host.parse_entrypoint(&project.path("later.js")).unwrap();

    let issues = summarize(&host.issues());
    let rules: Vec<_> = issues
        .iter()
        .map(|issue| (issue.rule.as_str(), issue.module.as_str()))
        .collect();
    assert_eq!(
        rules,
        [
            ("use-before-execution", "entry.js"),
            ("import-cycle", "functioncycle.js"),
        ]
    );
}
