mod common;

use common::{Project, reported, summarize};

const ENTRY: &str = r#"import { useFoo } from "./module";
import type { Config } from "./types";

export const foo: Config = { name: "foo" };
"#;

const MODULE: &str = r#"import { foo } from "./entry";
import type { Config } from "./types";
export let a = foo;

export const useFoo = (config: Config): string => config.name + a;
"#;

const TYPES: &str = "export interface Config {\n  name: string;\n}\n";

fn project() -> Project {
    Project::new(&[("entry.ts", ENTRY), ("module.ts", MODULE), ("types.ts", TYPES)])
}

#[test]
fn typescript_modules() {
    let project = project();
    let host = project.analyze_with("entry.ts", &[".ts"]);

    assert_eq!(
        summarize(&host.issues()),
        vec![
            reported(
                "import-cycle",
                "module.ts",
                "ImportDeclaration",
                (1, 0),
                (1, 30),
                "Import cycle: entry.ts -> module.ts -> entry.ts",
            ),
            reported(
                "use-before-execution",
                "module.ts",
                "Identifier",
                (3, 15),
                (3, 18),
                "Imported 'foo' is used before 'entry.ts' has been evaluated.",
            ),
        ]
    );
}

#[test]
fn type_only_imports_are_not_loaded() {
    let project = project();
    let host = project.analyze_with("entry.ts", &[".ts"]);
    assert_eq!(project.file_names(&host), ["entry.ts", "module.ts"]);
}
