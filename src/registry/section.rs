/// A named partition of the chassis (one CubeSat unit).
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    visible: bool,
    /// Component ids in the order they joined this section
    members: Vec<String>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|member| member == id)
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn insert(&mut self, id: String) {
        self.members.push(id);
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        match self.members.iter().position(|member| member == id) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
    }
}

pub(crate) fn find_section(sections: &[Section], name: &str) -> Option<usize> {
    sections.iter().position(|section| section.name == name)
}
