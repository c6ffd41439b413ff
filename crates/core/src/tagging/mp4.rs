//! MP4 item list (`ilst`) atom writes.

use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst};
use lofty::tag::Accessor as _;
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::cover::{describe_picture, CoverArt};
use super::error::TagError;
use super::mapping::{AtomKey, TagMappings};
use super::value::TagValue;

const DISK: [u8; 4] = *b"disk";
const TRACK: [u8; 4] = *b"trkn";
const COVER: [u8; 4] = *b"covr";

/// Writes `value` to the atom mapped for `key`.
///
/// Unmapped keys become free-form atoms in the iTunes namespace.
pub(crate) fn set(
    ilst: &mut Ilst,
    mappings: &TagMappings,
    key: &str,
    value: &TagValue,
) -> Result<(), TagError> {
    let atom_key = mappings
        .atom(key)
        .map(|m| m.key.clone())
        .unwrap_or_else(|| AtomKey::itunes(key));

    match atom_key {
        AtomKey::Fourcc(code @ (DISK | TRACK)) => set_number_pair(ilst, code, value),
        other => {
            let ident = ident(&other);
            let mut items = value.items().into_iter().map(AtomData::UTF8);
            let Some(first) = items.next() else {
                return Err(TagError::value(format!("No value given for tag: {}", key)));
            };
            let mut atom = Atom::new(ident.clone(), first);
            items.for_each(|data| atom.push_data(data));

            ilst.remove(&ident).for_each(drop);
            ilst.insert(atom);
            Ok(())
        }
    }
}

/// Replaces the `covr` atom.
pub(crate) fn set_cover(ilst: &mut Ilst, cover: CoverArt) {
    let ident = AtomIdent::Fourcc(COVER);
    ilst.remove(&ident).for_each(drop);
    ilst.insert(Atom::new(ident, AtomData::Picture(cover.into_picture(None))));
}

/// Drops the `covr` atom with all of its images.
pub(crate) fn remove_cover(ilst: &mut Ilst) -> bool {
    ilst.remove(&AtomIdent::Fourcc(COVER)).count() > 0
}

/// Deletes the mapped atom, or the free-form atom an unmapped write would
/// have created, plus an atom named by the raw key.
pub(crate) fn remove(ilst: &mut Ilst, mappings: &TagMappings, key: &str) -> bool {
    let mut targets = vec![mappings
        .atom(key)
        .map(|m| m.key.clone())
        .unwrap_or_else(|| AtomKey::itunes(key))];
    targets.extend(AtomKey::parse(key));

    targets
        .iter()
        .map(|target| ilst.remove(&ident(target)).count())
        .sum::<usize>()
        > 0
}

pub(crate) fn snapshot(ilst: &Ilst, out: &mut BTreeMap<String, String>) {
    for atom in ilst {
        let rendered = match atom.ident() {
            AtomIdent::Fourcc(DISK) => number_pair(ilst.disk(), ilst.disk_total()),
            AtomIdent::Fourcc(TRACK) => number_pair(ilst.track(), ilst.track_total()),
            _ => atom.data().map(render).collect::<Vec<_>>().join("; "),
        };
        out.insert(key_of(atom.ident()), rendered);
    }
}

/// Parses `N` or `N/T`; a missing total is stored as 0. Fractional parts
/// are truncated.
fn parse_number_pair(text: &str) -> Option<(u32, u32)> {
    match text.trim().split_once('/') {
        Some((number, total)) => Some((parse_number(number)?, parse_number(total)?)),
        None => Some((parse_number(text)?, 0)),
    }
}

fn parse_number(text: &str) -> Option<u32> {
    let number: f64 = text.trim().parse().ok()?;
    (number.is_finite() && number >= 0.0 && number < f64::from(u32::MAX) + 1.0)
        .then(|| number.trunc() as u32)
}

fn set_number_pair(ilst: &mut Ilst, code: [u8; 4], value: &TagValue) -> Result<(), TagError> {
    let label = if code == DISK { "disc" } else { "track" };
    let (number, total) = value
        .as_text()
        .as_deref()
        .and_then(parse_number_pair)
        .ok_or_else(|| {
            TagError::metadata(format!(
                "Invalid {} number: {}. Use 'N' or 'N/total'.",
                label, value
            ))
        })?;

    ilst.remove(&AtomIdent::Fourcc(code)).for_each(drop);
    if code == DISK {
        ilst.set_disk(number);
        if total > 0 {
            ilst.set_disk_total(total);
        }
    } else {
        ilst.set_track(number);
        if total > 0 {
            ilst.set_track_total(total);
        }
    }
    Ok(())
}

fn ident(key: &AtomKey) -> AtomIdent<'static> {
    match key {
        AtomKey::Fourcc(code) => AtomIdent::Fourcc(*code),
        AtomKey::Freeform { mean, name } => AtomIdent::Freeform {
            mean: Cow::Owned(mean.clone()),
            name: Cow::Owned(name.clone()),
        },
    }
}

fn key_of(ident: &AtomIdent<'_>) -> String {
    match ident {
        AtomIdent::Fourcc(code) => AtomKey::Fourcc(*code).to_string(),
        AtomIdent::Freeform { mean, name } => format!("----:{}:{}", mean, name),
    }
}

fn number_pair(number: Option<u32>, total: Option<u32>) -> String {
    format!("{}/{}", number.unwrap_or(0), total.unwrap_or(0))
}

fn render(data: &AtomData) -> String {
    match data {
        AtomData::UTF8(s) | AtomData::UTF16(s) => s.clone(),
        AtomData::Picture(picture) => describe_picture(picture),
        AtomData::SignedInteger(n) => n.to_string(),
        AtomData::UnsignedInteger(n) => n.to_string(),
        AtomData::Bool(b) => b.to_string(),
        _ => "<binary>".to_string(),
    }
}
