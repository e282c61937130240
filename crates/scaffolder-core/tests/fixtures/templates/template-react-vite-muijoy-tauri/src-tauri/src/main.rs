fn main() {
    println!("my-app-project-name");
}
