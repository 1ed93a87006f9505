//! Builds a small corpus from disk and checks the rendered traceability rows.

use std::{fs, path::Path};

use rigr::{BlockKind, Corpus};
use tempfile::TempDir;

const CONFIG: &str = r##"
_version = "1"
default_status = "draft"

[[link_types]]
option = "satisfies"
outgoing = "satisfies"
incoming = "satisfied_by"

[[link_types]]
option = "implements"
outgoing = "implements"
incoming = "implemented_by"

[[link_types]]
option = "depends_on"

[[statuses]]
status = "approved"
color = "#4CAF50"
"##;

const STAKEHOLDER: &str = "\
Stakeholder needs
=================

.. item:: Users can log in
   :id: STK-001
   :level: stakeholder
   :status: approved
";

const SYSTEM: &str = "\
.. item:: Password login
   :id: SYS-001
   :satisfies: STK-001

   The system accepts a user name and password.

.. item:: Single sign-on
   :id: SYS-002
   :satisfies: STK-001
   :depends_on: SYS-001
";

const DESIGN: &str = "\
.. graphic:: Login flow
   :id: FIG-001
   :implements: SYS-001

   @startuml
   User -> System : credentials
   @enduml

.. listing:: Login handler
   :id: CODE-001
   :language: rust
   :implements: SYS-001, SYS-002

   fn login() {}
";

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn corpus() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "rigr.toml", CONFIG);
    write(tmp.path(), "a_stakeholder.rst", STAKEHOLDER);
    write(tmp.path(), "b_system/requirements.rst", SYSTEM);
    write(tmp.path(), "c_design.rst", DESIGN);
    tmp
}

#[test]
fn inverse_rows_are_injected_across_the_corpus() {
    let tmp = corpus();

    let rendered = Corpus::new(tmp.path().to_path_buf())
        .load()
        .unwrap()
        .render(false);

    let stakeholder = rendered.find_block(BlockKind::Item, "STK-001").unwrap();
    assert_eq!(stakeholder.row_value("Satisfied By"), Some("SYS-001, SYS-002"));

    let password = rendered.find_block(BlockKind::Item, "SYS-001").unwrap();
    assert_eq!(password.row_value("Satisfies"), Some("STK-001"));
    assert_eq!(password.row_value("Implemented By"), Some("FIG-001, CODE-001"));
    assert_eq!(password.row_value("Depends On (Incoming)"), Some("SYS-002"));

    let sso = rendered.find_block(BlockKind::Item, "SYS-002").unwrap();
    assert_eq!(sso.row_value("Depends On"), Some("SYS-001"));
    assert_eq!(sso.row_value("Implemented By"), Some("CODE-001"));

    let listing = rendered.find_block(BlockKind::Listing, "CODE-001").unwrap();
    assert_eq!(listing.row_value("Implements"), Some("SYS-001, SYS-002"));
    assert_eq!(listing.rows().len(), 2);

    let resolution = rendered.resolution();
    assert_eq!(resolution.registry.len(), 5);
    assert_eq!(resolution.link_count(), 6);
    assert_eq!(resolution.injected_rows, 4);
}

#[test]
fn html_pages_mirror_the_source_tree() {
    let tmp = corpus();
    let out = TempDir::new().unwrap();

    let written = Corpus::new(tmp.path().to_path_buf())
        .load()
        .unwrap()
        .render(true)
        .write_html(out.path())
        .unwrap();

    assert_eq!(written.len(), 3);
    let page = fs::read_to_string(out.path().join("b_system/requirements.html")).unwrap();
    assert!(page.contains("<div class=\"rigr-item rigr-type-requirement rigr-status-draft\" id=\"req-SYS-001\">"));
    assert!(page.contains("<td class=\"rigr-field-depends-on-incoming\"><p><span>SYS-002</span></p></td>"));
    assert!(page.contains("<p>The system accepts a user name and password.</p>"));

    let stakeholder = fs::read_to_string(out.path().join("a_stakeholder.html")).unwrap();
    assert!(stakeholder.contains("style=\"background-color: #4CAF50\""));
    assert!(stakeholder.contains("<td class=\"rigr-field-satisfied-by\">"));

    let design = fs::read_to_string(out.path().join("c_design.html")).unwrap();
    assert!(design.contains("<pre class=\"uml\">@startuml\nUser -&gt; System : credentials\n@enduml</pre>"));
    assert!(design.contains("<code class=\"language-rust\">fn login() {}</code>"));
}
