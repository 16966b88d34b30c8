fn main() {
    xray_triage::start();
}
