/*
 * mailfmt - address module
 *
 * Copyright 2024 mailfmt Contributors
 *
 * This file is part of mailfmt.
 *
 * mailfmt is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * mailfmt is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with mailfmt. If not, see <http://www.gnu.org/licenses/>.
 */

//! Display formatting for already-parsed mail addresses.

use std::{borrow::Cow, fmt};

use smallvec::SmallVec;

/// Recipient list storage, as produced by an upstream envelope layer.
pub type AddressList = SmallVec<[Address; 1]>;

/**
 * Container for one already-parsed address.
 *
 * The four fields mirror the positional slots of an envelope address:
 *
 * ```text
 * (display_name, source_route, mailbox, host)
 *       │             │            │      │
 *       │             │            └──────┴── mailbox@host
 *       │             └── at-domain list, carried but never read
 *       └── personal name, may be unpopulated or empty
 * ```
 *
 * `None` in a slot means the slot was never populated. An `Address` with no
 * populated slot at all (see [`Address::is_empty`]) is distinct from the
 * *absent* address, which is expressed as `None` at the API boundary of the
 * formatting functions.
 */
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Address {
    pub display_name: Option<String>,
    pub source_route: Option<String>,
    pub mailbox: Option<String>,
    pub host: Option<String>,
}

bitflags! {
    /// Rendering options for [`display_address`].
    ///
    /// With no flag set, a named address renders as `Name <mailbox@host>`.
    /// `NAME_ONLY` takes precedence over `ADDRESS_ONLY`; `HTML_LINK` turns
    /// the address part into a `mailto:` hyperlink fragment.
    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    pub struct AddressStyle: u8 {
        const NAME_ONLY    = 0b0000_0001;
        const ADDRESS_ONLY = 0b0000_0010;
        const HTML_LINK    = 0b0000_0100;
    }
}

impl Address {
    pub fn new(display_name: Option<&str>, mailbox: &str, host: &str) -> Self {
        Self {
            display_name: display_name.map(str::to_string),
            source_route: None,
            mailbox: Some(mailbox.to_string()),
            host: Some(host.to_string()),
        }
    }

    /// Whether no positional slot is populated.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.source_route.is_none()
            && self.mailbox.is_none()
            && self.host.is_none()
    }

    /// `mailbox@host`, concatenating whatever is present. Partially
    /// populated addresses are not validated here; that is the job of the
    /// upstream model layer.
    pub fn address_spec(&self) -> String {
        format!(
            "{}@{}",
            self.mailbox.as_deref().unwrap_or_default(),
            self.host.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => {
                write!(f, "{} <{}>", name, self.address_spec())
            }
            _ if self.is_empty() => Ok(()),
            _ => write!(f, "{}", self.address_spec()),
        }
    }
}

/// Whether `addr` carries any address data: false for the absent address
/// and for one with no populated slot.
pub fn is_address_valid(addr: Option<&Address>) -> bool {
    addr.map_or(false, |a| !a.is_empty())
}

fn html_escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(input);
    }
    let mut ret = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => ret.push_str("&amp;"),
            '<' => ret.push_str("&lt;"),
            '>' => ret.push_str("&gt;"),
            '"' => ret.push_str("&quot;"),
            _ => ret.push(ch),
        }
    }
    Cow::Owned(ret)
}

fn mailto_fragment(address: &str) -> String {
    let address = html_escape(address);
    format!("<a href=\"mailto:{}\">{}</a>", address, address)
}

/// Render one address for display.
///
/// Returns `None` when `addr` is absent or has no populated slot; callers
/// must not conflate that with `Some(String::new())`, which a populated
/// address with blank fields can legitimately produce.
///
/// A named address honors `style`; an address without a display name
/// renders as the bare `mailbox@host` string under every flag combination,
/// including `HTML_LINK`. Historical behavior, kept as-is.
pub fn display_address(addr: Option<&Address>, style: AddressStyle) -> Option<String> {
    let addr = addr.filter(|a| !a.is_empty())?;
    let address = addr.address_spec();
    let ret = match addr.display_name.as_deref() {
        Some(name) if !name.is_empty() => {
            if style.contains(AddressStyle::NAME_ONLY) {
                name.to_string()
            } else if style.contains(AddressStyle::ADDRESS_ONLY) {
                if style.contains(AddressStyle::HTML_LINK) {
                    mailto_fragment(&address)
                } else {
                    address
                }
            } else if style.contains(AddressStyle::HTML_LINK) {
                format!("{}{}", html_escape(name), mailto_fragment(&address))
            } else {
                format!("{} <{}>", name, address)
            }
        }
        _ => address,
    };
    Some(ret)
}

/// Render an ordered recipient list for display.
///
/// An absent list renders as the empty string, exactly like an empty one.
/// Every element goes through [`display_address`] with the same `style`;
/// elements without address data render as empty strings and keep their
/// position in the joined output rather than being dropped.
pub fn display_address_list(list: Option<&[Address]>, style: AddressStyle) -> String {
    let list = match list {
        Some(l) => l,
        None => return String::new(),
    };
    let mut parts = list
        .iter()
        .map(|a| display_address(Some(a), style).unwrap_or_default());
    if list.len() == 1 {
        return parts.next().unwrap_or_default();
    }
    parts.collect::<Vec<String>>().join(", ")
}
