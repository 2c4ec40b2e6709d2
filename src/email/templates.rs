pub fn render_welcome(
    name: &str,
    employee_code: &str,
    temp_password: &str,
    base_url: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Welcome to StaffHub</h2>
    <p>Hi {name},</p>
    <p>Your employee account has been created.</p>
    <p>Employee code: <strong>{employee_code}</strong><br>
    Temporary password: <strong>{temp_password}</strong></p>
    <p>You will be asked to choose a new password the first time you log in.</p>
    <p><a href="{base_url}" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Log In</a></p>
    <p style="color: #666; font-size: 14px;">If you didn't expect this email, contact your HR department.</p>
</body>
</html>"#
    )
}

pub fn render_password_reset(reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset</h2>
    <p>A password reset was requested for your StaffHub account.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Reset Password</a></p>
    <p style="color: #666; font-size: 14px;">This link expires in 1 hour. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}

pub fn render_password_changed(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Changed</h2>
    <p>Hi {name},</p>
    <p>The password on your StaffHub account was just changed.</p>
    <p style="color: #666; font-size: 14px;">If this wasn't you, contact your HR department immediately.</p>
</body>
</html>"#
    )
}
