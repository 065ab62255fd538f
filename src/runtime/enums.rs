//! Script-declared enums.

use std::rc::Rc;

/// An enum declared with `enum Name { A, B }`.
#[derive(Debug)]
pub struct ZrEnum {
    name: Rc<str>,
    items: Vec<Rc<ZrEnumItem>>,
}

impl ZrEnum {
    /// Build an enum; items are indexed in declaration order.
    pub fn new<'a>(name: &str, items: impl IntoIterator<Item = &'a str>) -> Self {
        let name: Rc<str> = Rc::from(name);
        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                Rc::new(ZrEnumItem {
                    enum_name: Rc::clone(&name),
                    name: Rc::from(item),
                    index: index as u32,
                })
            })
            .collect();
        Self { name, items }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item(&self, name: &str) -> Option<Rc<ZrEnumItem>> {
        self.items.iter().find(|item| &*item.name == name).cloned()
    }

    pub fn items(&self) -> &[Rc<ZrEnumItem>] {
        &self.items
    }
}

/// One member of a [`ZrEnum`].
#[derive(Debug)]
pub struct ZrEnumItem {
    enum_name: Rc<str>,
    name: Rc<str>,
    index: u32,
}

impl ZrEnumItem {
    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Items compare by enum name and item name.
impl PartialEq for ZrEnumItem {
    fn eq(&self, other: &Self) -> bool {
        self.enum_name == other.enum_name && self.name == other.name
    }
}
