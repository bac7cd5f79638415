/// Collection owned by `owner_email`: `@` and `.` become `_`, then the deployment suffix.
pub fn collection_for_owner(owner_email: &str, suffix: &str) -> String {
	let mut name = owner_email.replace(['@', '.'], "_");

	name.push_str(suffix);

	name
}
