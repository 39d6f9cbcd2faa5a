use sensitive_words::Walk;

#[derive(Walk)]
enum Event {
    Posted(String),
    Edited {
        before: String,
        #[walk(tag = "Review")]
        after: String,
    },
    #[walk(ignore)]
    Imported(String),
    Deleted,
}

#[derive(Walk)]
enum Never {}

fn main() {
    let _ = Event::Posted(String::new());
    let _ = Event::Imported(String::new());
    let _ = Event::Deleted;
    let _ = Event::Edited {
        before: String::new(),
        after: String::new(),
    };
}
