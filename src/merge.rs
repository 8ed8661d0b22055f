//! Base/profile property merging.
//!
//! The base map supplies defaults; the profile map overrides them key by key.
//! Both inputs are borrowed so the same base can be merged with every profile
//! of an application without one merge leaking into the next.

use crate::types::PropertyMap;

/// Merge `profile` over `base`, returning a new map.
///
/// The result holds the union of keys. On collision the profile value wins.
///
/// # Example
/// ```
/// use config_hub::merge::merge;
/// use config_hub::types::PropertyMap;
///
/// let base = PropertyMap::from([("timeout".into(), "30".into())]);
/// let prod = PropertyMap::from([
///     ("timeout".into(), "5".into()),
///     ("region".into(), "us".into()),
/// ]);
/// let merged = merge(&base, &prod);
/// assert_eq!(merged["timeout"], "5");
/// assert_eq!(merged["region"], "us");
/// assert_eq!(base["timeout"], "30");
/// ```
pub fn merge(base: &PropertyMap, profile: &PropertyMap) -> PropertyMap {
    let mut merged = base.clone();
    merged.extend(profile.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
