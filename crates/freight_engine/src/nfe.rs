use roxmltree::{Document, Node};

use freight_core::{NfeData, Party};
use freight_logging::freight_warn;

use crate::decode::decode_xml;

/// Pulls pickup metadata out of an NF-e document.
///
/// Elements are matched by local name, so default and prefixed namespaces both
/// work, as do bare `NFe` documents and `nfeProc` envelopes. Anything missing
/// stays empty; undecodable or malformed XML yields an all-empty result.
pub fn extract_nfe(bytes: &[u8]) -> NfeData {
    let text = match decode_xml(bytes) {
        Ok(text) => text,
        Err(err) => {
            freight_warn!("NF-e not decodable: {}", err);
            return NfeData::default();
        }
    };
    let document = match Document::parse(&text) {
        Ok(document) => document,
        Err(err) => {
            freight_warn!("NF-e is not well-formed XML: {}", err);
            return NfeData::default();
        }
    };

    let root = document.root_element();
    let ide = find(root, "ide");

    let issued_at = match text_in(ide, "dhEmi") {
        empty if empty.is_empty() => text_in(ide, "dEmi"),
        value => value,
    };
    let total_value = match find(root, "ICMSTot") {
        Some(totals) => text_of(totals, "vNF"),
        None => text_of(root, "vNF"),
    };

    NfeData {
        number: text_in(ide, "nNF"),
        series: text_in(ide, "serie"),
        issued_at,
        total_value,
        origin: party(find(root, "emit"), "enderEmit"),
        destination: party(find(root, "dest"), "enderDest"),
    }
}

fn text_in(node: Option<Node>, name: &str) -> String {
    node.map(|n| text_of(n, name)).unwrap_or_default()
}

fn party(node: Option<Node>, address_tag: &str) -> Party {
    let Some(node) = node else {
        return Party::default();
    };
    let address = find(node, address_tag).unwrap_or(node);
    let tax_id = match text_of(node, "CNPJ") {
        empty if empty.is_empty() => text_of(node, "CPF"),
        cnpj => cnpj,
    };
    Party {
        name: text_of(node, "xNome"),
        tax_id,
        postal_code: text_of(address, "CEP"),
        city: text_of(address, "xMun"),
        state: text_of(address, "UF"),
    }
}

fn find<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn text_of(node: Node, name: &str) -> String {
    find(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}
