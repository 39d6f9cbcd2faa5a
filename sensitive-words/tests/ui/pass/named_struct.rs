use std::collections::HashMap;

use sensitive_words::Walk;

#[derive(Walk)]
struct Profile {
    name: String,
    age: u32,
    #[walk(tag = "Contact")]
    phone: Option<String>,
    notes: Vec<String>,
    labels: HashMap<String, String>,
}

fn main() {
    let _ = Profile {
        name: String::new(),
        age: 0,
        phone: None,
        notes: Vec::new(),
        labels: HashMap::new(),
    };
}
