fn main() {
    satchel::run();
}
