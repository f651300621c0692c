//! Annotation and label helpers.
//!
//! The cross-object contract between hosts, agents and spoke clusters is
//! carried in string-keyed annotations and labels. All marshalling in and
//! out of object metadata is isolated here; the rest of the reconciler
//! works with typed values and change flags.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;

/// Reads an annotation value.
pub fn get_annotation<'a, K: Resource>(obj: &'a K, key: &str) -> Option<&'a str> {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .map(String::as_str)
}

/// Whether the annotation is present, regardless of value.
pub fn has_annotation<K: Resource>(obj: &K, key: &str) -> bool {
    get_annotation(obj, key).is_some()
}

/// Sets an annotation, returning whether the object changed.
pub fn set_annotation<K: Resource>(obj: &mut K, key: &str, value: &str) -> bool {
    set_meta_entry(meta_annotations(obj.meta_mut()), key, value)
}

/// Removes an annotation, returning whether the object changed.
pub fn remove_annotation<K: Resource>(obj: &mut K, key: &str) -> bool {
    obj.meta_mut()
        .annotations
        .as_mut()
        .and_then(|annotations| annotations.remove(key))
        .is_some()
}

/// Sets a label, returning whether the object changed.
pub fn set_label<K: Resource>(obj: &mut K, key: &str, value: &str) -> bool {
    set_meta_entry(meta_labels(obj.meta_mut()), key, value)
}

fn meta_annotations(meta: &mut ObjectMeta) -> &mut std::collections::BTreeMap<String, String> {
    meta.annotations.get_or_insert_with(Default::default)
}

fn meta_labels(meta: &mut ObjectMeta) -> &mut std::collections::BTreeMap<String, String> {
    meta.labels.get_or_insert_with(Default::default)
}

fn set_meta_entry(
    map: &mut std::collections::BTreeMap<String, String>,
    key: &str,
    value: &str,
) -> bool {
    if map.get(key).map(String::as_str) == Some(value) {
        return false;
    }
    map.insert(key.to_string(), value.to_string());
    true
}
