mod common;

use common::{Project, reported, summarize};
use esm_cycles::{BindingName, ExportResolution, resolve_export};

const ENTRY: &str = "import \"./module.js\";\nexport const entryValue = 1;\n";

const MODULE: &str = r#"import { direct } from "./direct.js";
import { named } from "./namedExport.js";
import { star } from "./starExport.js";
import * as ns from "./starImported.js";
"#;

const DIRECT: &str = "import { entryValue } from \"./entry.js\";\nexport const direct = 1;\n";
const NAMED: &str =
    "import { entryValue } from \"./entry.js\";\nexport { entryValue as named };\n";
const STAR: &str = "import { entryValue } from \"./entry.js\";\nexport * from \"./direct.js\";\nexport const star = 3;\n";
const STAR_IMPORTED: &str =
    "import { entryValue } from \"./entry.js\";\nexport const imported = 4;\n";

fn project() -> Project {
    Project::new(&[
        ("entry.js", ENTRY),
        ("module.js", MODULE),
        ("direct.js", DIRECT),
        ("namedExport.js", NAMED),
        ("starExport.js", STAR),
        ("starImported.js", STAR_IMPORTED),
    ])
}

#[test]
fn every_way_back_to_the_entry_is_a_cycle() {
    let project = project();
    let host = project.analyze("entry.js");

    let cycle = |module: &str| {
        reported(
            "import-cycle",
            module,
            "ImportDeclaration",
            (1, 0),
            (1, 40),
            &format!("Import cycle: entry.js -> module.js -> {module} -> entry.js"),
        )
    };
    assert_eq!(
        summarize(&host.issues()),
        vec![
            cycle("direct.js"),
            cycle("namedExport.js"),
            cycle("starExport.js"),
            cycle("starImported.js"),
        ]
    );
}

#[test]
fn every_module_is_loaded() {
    let project = project();
    let host = project.analyze("entry.js");
    assert_eq!(
        project.file_names(&host),
        [
            "direct.js",
            "entry.js",
            "module.js",
            "namedExport.js",
            "starExport.js",
            "starImported.js",
        ]
    );
}

#[test]
fn re_exported_imports_resolve_to_their_origin() {
    let project = project();
    let mut host = project.analyze("entry.js");

    let named = host.module_id(project.path("namedExport.js")).unwrap();
    let entry = host.module_id(project.path("entry.js")).unwrap();
    let ExportResolution::Resolved(binding) =
        resolve_export(&mut host, named, "named", &mut Vec::new()).unwrap()
    else {
        panic!("named should resolve");
    };
    assert_eq!(binding.module, entry);
    assert_eq!(binding.binding, BindingName::Name("entryValue".to_string()));

    let star = host.module_id(project.path("starExport.js")).unwrap();
    let direct = host.module_id(project.path("direct.js")).unwrap();
    let ExportResolution::Resolved(binding) =
        resolve_export(&mut host, star, "direct", &mut Vec::new()).unwrap()
    else {
        panic!("direct should resolve through the star export");
    };
    assert_eq!(binding.module, direct);
}
