//! Navigation over nested documents.
//!
//! The navigator walks a [`Path`] through a [`Value`] tree. Reads report
//! absence instead of failing; writes resolve down to the parent container
//! (creating missing intermediates when asked to) and hand back a [`Slot`]
//! for the final segment. A type mismatch between a segment and the node it
//! addresses is always an error, never a coercion.

use super::path::{Path, PathSegment};
use crate::value::{Map, Value};
use thiserror::Error;

/// NavigationError represents a path that cannot be resolved against a
/// document because a segment does not match the container it addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{path}: segment {depth} expects a map, found {found}")]
    NotAMap {
        path: String,
        depth: usize,
        found: &'static str,
    },

    #[error("{path}: segment {depth} expects a list, found {found}")]
    NotAList {
        path: String,
        depth: usize,
        found: &'static str,
    },

    #[error("{path}: list index {index} is past the end (length {len})")]
    IndexPastEnd {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("empty path")]
    EmptyPath,
}

/// Policy for list writes addressing an index beyond the current length.
///
/// Writing at exactly the current length appends under either policy;
/// the policies differ on indices strictly past the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListGrowth {
    /// Pad the list with `Null` entries up to the index, then write.
    #[default]
    PadWithNull,
    /// Refuse the write.
    Reject,
}

/// A resolved write position: the parent container plus the final segment.
#[derive(Debug)]
pub struct Slot<'a> {
    place: Place<'a>,
    growth: ListGrowth,
}

#[derive(Debug)]
enum Place<'a> {
    Map { map: &'a mut Map, key: String },
    List { list: &'a mut Vec<Value>, index: usize },
}

impl Slot<'_> {
    /// Reads the current value of the slot, if the key/index exists.
    pub fn get(&self) -> Option<&Value> {
        match &self.place {
            Place::Map { map, key } => map.get(key),
            Place::List { list, index } => list.get(*index),
        }
    }

    /// Writes a value into the slot, growing a list parent per policy.
    pub fn set(&mut self, value: Value, full_path: &Path) -> Result<(), NavigationError> {
        match &mut self.place {
            Place::Map { map, key } => {
                map.set(key.clone(), value);
                Ok(())
            }
            Place::List { list, index } => {
                if *index < list.len() {
                    list[*index] = value;
                } else {
                    if *index > list.len() && self.growth == ListGrowth::Reject {
                        return Err(NavigationError::IndexPastEnd {
                            path: full_path.to_string(),
                            index: *index,
                            len: list.len(),
                        });
                    }
                    while list.len() < *index {
                        list.push(Value::Null);
                    }
                    list.push(value);
                }
                Ok(())
            }
        }
    }

    /// Removes the slot. Removing a list element shifts later indices
    /// down. Returns the removed value, or `None` if the slot was absent.
    pub fn remove(&mut self) -> Option<Value> {
        match &mut self.place {
            Place::Map { map, key } => map.delete(key),
            Place::List { list, index } => {
                if *index < list.len() {
                    Some(list.remove(*index))
                } else {
                    None
                }
            }
        }
    }
}

/// Read-only walk. Returns `Ok(None)` when any segment addresses an absent
/// key or out-of-bounds index; a `Null` intermediate counts as absent.
pub fn lookup<'a>(root: &'a Value, path: &Path) -> Result<Option<&'a Value>, NavigationError> {
    if path.is_empty() {
        return Err(NavigationError::EmptyPath);
    }
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        current = match (segment, current) {
            (_, Value::Null) => return Ok(None),
            (PathSegment::Field(name), Value::Map(map)) => match map.get(name) {
                Some(v) => v,
                None => return Ok(None),
            },
            (PathSegment::Field(_), other) => {
                return Err(NavigationError::NotAMap {
                    path: path.to_string(),
                    depth,
                    found: other.type_name(),
                })
            }
            (PathSegment::Index(index), Value::List(list)) => match list.get(*index) {
                Some(v) => v,
                None => return Ok(None),
            },
            (PathSegment::Index(_), other) => {
                return Err(NavigationError::NotAList {
                    path: path.to_string(),
                    depth,
                    found: other.type_name(),
                })
            }
        };
    }
    Ok(Some(current))
}

fn empty_container_for(segment: &PathSegment) -> Value {
    match segment {
        PathSegment::Field(_) => Value::Map(Map::new()),
        PathSegment::Index(_) => Value::List(Vec::new()),
    }
}

/// Validates every index segment of the path against the current document
/// before any intermediate container is created, so a refused write leaves
/// the document exactly as it was. Absent nodes count as empty lists; a
/// type mismatch is left for the mutating walk to report.
fn check_index_bounds(root: &Value, path: &Path) -> Result<(), NavigationError> {
    let mut current = Some(root);
    for segment in path.iter() {
        current = match (segment, current) {
            (PathSegment::Index(index), node) => {
                let len = match node {
                    Some(Value::List(list)) => list.len(),
                    Some(Value::Null) | None => 0,
                    Some(_) => return Ok(()),
                };
                if *index > len {
                    return Err(NavigationError::IndexPastEnd {
                        path: path.to_string(),
                        index: *index,
                        len,
                    });
                }
                match node {
                    Some(Value::List(list)) => list.get(*index),
                    _ => None,
                }
            }
            (PathSegment::Field(name), Some(Value::Map(map))) => map.get(name),
            (PathSegment::Field(_), Some(Value::Null) | None) => None,
            (PathSegment::Field(_), Some(_)) => return Ok(()),
        };
    }
    Ok(())
}

/// Resolves a path down to the parent of its final segment and returns a
/// [`Slot`] for that segment.
///
/// With `create` set, missing intermediates are inserted as an empty map
/// or list chosen by the kind of the following segment, and `Null` nodes
/// are replaced the same way. Without `create`, any absent intermediate
/// resolves to `Ok(None)`. Under [`ListGrowth::Reject`] an out-of-bounds
/// index anywhere in the path fails before anything is created.
pub fn slot_mut<'a>(
    root: &'a mut Value,
    path: &Path,
    create: bool,
    growth: ListGrowth,
) -> Result<Option<Slot<'a>>, NavigationError> {
    let (last, parents) = path.split_last().ok_or(NavigationError::EmptyPath)?;
    if create && growth == ListGrowth::Reject {
        check_index_bounds(root, path)?;
    }
    let mut current = root;

    for (depth, segment) in parents.iter().enumerate() {
        if current.is_null() {
            if !create {
                return Ok(None);
            }
            *current = empty_container_for(segment);
        }
        let next = parents.get(depth + 1).unwrap_or(last);
        current = match (segment, current) {
            (PathSegment::Field(name), Value::Map(map)) => {
                if !map.has(name) {
                    if !create {
                        return Ok(None);
                    }
                    map.set(name.clone(), empty_container_for(next));
                }
                match map.get_mut(name) {
                    Some(v) => v,
                    None => return Ok(None),
                }
            }
            (PathSegment::Field(_), other) => {
                return Err(NavigationError::NotAMap {
                    path: path.to_string(),
                    depth,
                    found: other.type_name(),
                })
            }
            (PathSegment::Index(index), Value::List(list)) => {
                if *index >= list.len() {
                    if !create {
                        return Ok(None);
                    }
                    while list.len() <= *index {
                        list.push(Value::Null);
                    }
                }
                &mut list[*index]
            }
            (PathSegment::Index(_), other) => {
                return Err(NavigationError::NotAList {
                    path: path.to_string(),
                    depth,
                    found: other.type_name(),
                })
            }
        };
    }

    if current.is_null() {
        if !create {
            return Ok(None);
        }
        *current = empty_container_for(last);
    }

    let depth = parents.len();
    let place = match (last, current) {
        (PathSegment::Field(name), Value::Map(map)) => Place::Map {
            map,
            key: name.clone(),
        },
        (PathSegment::Field(_), other) => {
            return Err(NavigationError::NotAMap {
                path: path.to_string(),
                depth,
                found: other.type_name(),
            })
        }
        (PathSegment::Index(index), Value::List(list)) => Place::List {
            list,
            index: *index,
        },
        (PathSegment::Index(_), other) => {
            return Err(NavigationError::NotAList {
                path: path.to_string(),
                depth,
                found: other.type_name(),
            })
        }
    };
    Ok(Some(Slot { place, growth }))
}
