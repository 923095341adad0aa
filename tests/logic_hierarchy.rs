mod common;

use common::*;
use lsifscope::model::protocol::{
    EdgeData, Element, Id, ItemProperty, RangeTag, Span, SymbolKind, VertexData,
};
use lsifscope::semantics::SyntaxKind;

/// `a.ts` defines `class C { m() {} }`; `b.ts` defines `class D extends C`
/// overriding `m` and calling `d.m()`.
fn override_program() -> FixtureProgram {
    let mut p = FixtureProgram::new();
    let file_a = p.add_file("/proj/src/a.ts", "class C { m() {} }\n");
    let file_b = p.add_file("/proj/src/b.ts", "class D extends C { m() {} }\nd.m();\n");

    let class_c = p.add_symbol("C", "C", SymbolKind::Class);
    let c_m = p.add_symbol("C.m", "m", SymbolKind::Method);
    p.set_parent(c_m, class_c);
    p.add_member(class_c, c_m);

    let class_d = p.add_symbol("D", "D", SymbolKind::Class);
    let d_m = p.add_symbol("D.m", "m", SymbolKind::Method);
    p.set_parent(d_m, class_d);
    p.add_member(class_d, d_m);

    let c_decl = p.add_node(
        file_a,
        SyntaxKind::ClassDeclaration,
        Span::new(0, 0, 0, 18),
        "class C { m() {} }",
    );
    let c_name = p.add_name(c_decl, Span::new(0, 6, 0, 7), "C");
    p.declare(class_c, c_decl);
    p.bind(c_name, class_c);
    let m_decl_a = p.add_node(
        c_decl,
        SyntaxKind::MethodDeclaration,
        Span::new(0, 10, 0, 16),
        "m() {}",
    );
    let m_name_a = p.add_name(m_decl_a, Span::new(0, 10, 0, 11), "m");
    p.declare(c_m, m_decl_a);
    p.bind(m_name_a, c_m);

    let d_decl = p.add_node(
        file_b,
        SyntaxKind::ClassDeclaration,
        Span::new(0, 0, 0, 28),
        "class D extends C { m() {} }",
    );
    let d_name = p.add_name(d_decl, Span::new(0, 6, 0, 7), "D");
    p.declare(class_d, d_decl);
    p.bind(d_name, class_d);
    p.set_heritage(d_decl, vec![class_c]);
    let m_decl_b = p.add_node(
        d_decl,
        SyntaxKind::MethodDeclaration,
        Span::new(0, 20, 0, 26),
        "m() {}",
    );
    let m_name_b = p.add_name(m_decl_b, Span::new(0, 20, 0, 21), "m");
    p.declare(d_m, m_decl_b);
    p.bind(m_name_b, d_m);

    let call = p.add_node(file_b, SyntaxKind::Identifier, Span::new(1, 2, 1, 3), "m");
    p.bind(call, d_m);
    p
}

fn definition_ranges_named(elements: &[Element], text: &str) -> Vec<Id> {
    vertices(elements)
        .filter(|v| {
            matches!(
                &v.data,
                VertexData::Range {
                    tag: Some(RangeTag::Definition { text: t, .. }),
                    ..
                } if t == text
            )
        })
        .map(|v| v.id)
        .collect()
}

#[test]
fn test_override_definition_lands_in_base_partition() {
    let program = override_program();
    let elements = run(&program);

    let m_defs = definition_ranges_named(&elements, "m");
    assert_eq!(m_defs.len(), 2, "one definition range per declaring file");
    let (base_def, override_def) = (m_defs[0], m_defs[1]);

    let base_result_set = next_target(&elements, base_def).expect("C.m result set");
    let base_reference_result =
        reference_result_of(&elements, base_result_set).expect("C.m reference result");
    let doc_b = document_with_uri(&elements, "file:///proj/src/b.ts").unwrap();

    // D.m's definition range is filed into C.m's partition for b.ts under
    // the definitions property.
    let routed = item_edges(&elements).into_iter().any(|e| match &e.data {
        EdgeData::Item {
            out_v,
            in_vs,
            document,
            property,
        } => {
            *out_v == base_reference_result
                && *document == doc_b
                && *property == Some(ItemProperty::Definitions)
                && in_vs.contains(&override_def)
        }
        _ => unreachable!(),
    });
    assert!(routed, "override definition must reach the base partition");
}

#[test]
fn test_call_site_routes_into_base_partition_only() {
    let program = override_program();
    let elements = run(&program);

    let m_defs = definition_ranges_named(&elements, "m");
    let base_result_set = next_target(&elements, m_defs[0]).unwrap();
    let override_result_set = next_target(&elements, m_defs[1]).unwrap();
    assert_ne!(base_result_set, override_result_set);

    let base_reference_result = reference_result_of(&elements, base_result_set).unwrap();
    let call_range = reference_ranges(&elements, "m")[0];

    // The call is next-linked to D.m's result set but filed as a reference
    // in C.m's partition.
    assert_eq!(next_target(&elements, call_range), Some(override_result_set));
    let into_base = item_edges(&elements).into_iter().any(|e| match &e.data {
        EdgeData::Item {
            out_v,
            in_vs,
            property,
            ..
        } => {
            *out_v == base_reference_result
                && *property == Some(ItemProperty::References)
                && in_vs.contains(&call_range)
        }
        _ => unreachable!(),
    });
    assert!(into_base);

    if let Some(override_reference_result) =
        reference_result_of(&elements, override_result_set)
    {
        let into_override = item_edges(&elements).into_iter().any(|e| match &e.data {
            EdgeData::Item {
                out_v,
                in_vs,
                property,
                ..
            } => {
                *out_v == override_reference_result
                    && *property == Some(ItemProperty::References)
                    && in_vs.contains(&call_range)
            }
            _ => unreachable!(),
        });
        assert!(!into_override, "call must not be filed locally on D.m");
    }
}

#[test]
fn test_override_links_base_reference_result() {
    let program = override_program();
    let elements = run(&program);

    let m_defs = definition_ranges_named(&elements, "m");
    let base_result_set = next_target(&elements, m_defs[0]).unwrap();
    let override_result_set = next_target(&elements, m_defs[1]).unwrap();
    let base_reference_result = reference_result_of(&elements, base_result_set).unwrap();
    let override_reference_result =
        reference_result_of(&elements, override_result_set).expect("D.m reference result");
    let doc_b = document_with_uri(&elements, "file:///proj/src/b.ts").unwrap();

    // The overrides linkage: D.m's reference result item-links C.m's.
    let linked = item_edges(&elements).into_iter().any(|e| match &e.data {
        EdgeData::Item {
            out_v,
            in_vs,
            document,
            property,
        } => {
            *out_v == override_reference_result
                && *document == doc_b
                && property.is_none()
                && in_vs == &vec![base_reference_result]
        }
        _ => unreachable!(),
    });
    assert!(linked);
}

#[test]
fn test_method_without_bases_behaves_like_standard() {
    let program = override_program();
    let elements = run(&program);

    // C.m has no bases: its own definition is double-filed as definition
    // range and definitions-bucket reference in its own partition.
    let m_defs = definition_ranges_named(&elements, "m");
    let base_result_set = next_target(&elements, m_defs[0]).unwrap();
    let base_definition_result = definition_result_of(&elements, base_result_set).unwrap();
    let base_reference_result = reference_result_of(&elements, base_result_set).unwrap();
    let doc_a = document_with_uri(&elements, "file:///proj/src/a.ts").unwrap();

    let own_definition_item = item_edges(&elements).into_iter().any(|e| match &e.data {
        EdgeData::Item {
            out_v,
            in_vs,
            document,
            ..
        } => *out_v == base_definition_result && *document == doc_a && in_vs == &vec![m_defs[0]],
        _ => unreachable!(),
    });
    assert!(own_definition_item);

    let own_definitions_bucket = item_edges(&elements).into_iter().any(|e| match &e.data {
        EdgeData::Item {
            out_v,
            in_vs,
            document,
            property,
        } => {
            *out_v == base_reference_result
                && *document == doc_a
                && *property == Some(ItemProperty::Definitions)
                && in_vs == &vec![m_defs[0]]
        }
        _ => unreachable!(),
    });
    assert!(own_definitions_bucket);
}
