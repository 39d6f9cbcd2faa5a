//! Chinese phonetic replacement.
//!
//! The pronunciation data itself comes from a [`PhoneticTable`]; this module
//! only disambiguates polyphonic characters and renders pinyin, initials or
//! homophones.

mod convert;
mod homophone;
mod table;

pub use convert::{Phonetics, PinYinInfo, Pronunciation};
pub use homophone::HomophoneContexts;
pub use table::{PhoneticTable, StaticPhoneticTable};
