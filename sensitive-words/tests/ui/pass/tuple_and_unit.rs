use sensitive_words::Walk;

#[derive(Walk)]
struct Pair(String, #[walk(ignore)] String, u8);

#[derive(Walk)]
struct Marker;

#[derive(Walk)]
struct Counts {
    total: u64,
    ratio: f32,
}

fn main() {
    let _ = Pair(String::new(), String::new(), 0);
    let _ = Marker;
    let _ = Counts { total: 0, ratio: 0.0 };
}
