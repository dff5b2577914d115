fn main() {
    kazumyon::main();
}
