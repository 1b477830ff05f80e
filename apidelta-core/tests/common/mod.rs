use apidelta_core::{
    ApiSnapshot, DeclarationNode, NodeKind, ParameterInfo, SignatureInfo, TypeInfo,
};
use proptest::prelude::*;

/// Interface with property members.
#[allow(dead_code)]
pub fn interface(name: &str, properties: &[(&str, &str)]) -> DeclarationNode {
    properties
        .iter()
        .fold(DeclarationNode::new(name, NodeKind::Interface), |node, (prop, ty)| {
            node.with_child(DeclarationNode::new(prop, NodeKind::Property).with_signature(ty))
        })
}

/// Exported function with a call signature and one parameter child per parameter.
#[allow(dead_code)]
pub fn function(name: &str, params: &[(&str, &str)], returns: &str) -> DeclarationNode {
    let parameters: Vec<ParameterInfo> = params
        .iter()
        .map(|(n, t)| ParameterInfo::new(n, t))
        .collect();
    let signature = format!(
        "({}) => {}",
        params
            .iter()
            .map(|(n, t)| format!("{}: {}", n, t))
            .collect::<Vec<_>>()
            .join(", "),
        returns
    );

    let node = DeclarationNode::new(name, NodeKind::Function).with_type_info(TypeInfo {
        signature,
        return_type: Some(returns.to_string()),
        call_signatures: vec![SignatureInfo {
            parameters,
            return_type: Some(returns.to_string()),
            type_parameters: vec![],
        }],
        ..Default::default()
    });
    params.iter().fold(node, |node, (n, t)| {
        node.with_child(DeclarationNode::new(n, NodeKind::Parameter).with_signature(t))
    })
}

const SIGNATURES: &[&str] = &["string", "number", "boolean", "string | number", "Foo | undefined"];

/// Two-level snapshots of interfaces with property members.
#[allow(dead_code)]
pub fn arb_snapshot() -> impl Strategy<Value = ApiSnapshot> {
    let members = prop::collection::btree_map("[a-z]{1,6}", prop::sample::select(SIGNATURES), 0..4);
    prop::collection::btree_map(
        "[A-Z][a-z]{0,5}",
        (prop::sample::select(SIGNATURES), members),
        0..6,
    )
    .prop_map(|exports| {
        ApiSnapshot::new(
            exports
                .into_iter()
                .map(|(name, (signature, members))| {
                    members.into_iter().fold(
                        DeclarationNode::new(&name, NodeKind::Interface).with_signature(signature),
                        |node, (member, ty)| {
                            node.with_child(
                                DeclarationNode::new(&member, NodeKind::Property).with_signature(ty),
                            )
                        },
                    )
                })
                .collect(),
        )
    })
}
