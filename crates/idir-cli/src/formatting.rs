use std::str::FromStr;

use anyhow::Result;

use idir_data::{
    Admin, BoardMember, FormDoc, Member, Obituary, Payment, PaymentEntry, Post,
};

/// Which language's name columns to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Am,
}

impl FromStr for Lang {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "am" => Ok(Lang::Am),
            other => Err(anyhow::anyhow!("unknown language: {}", other)),
        }
    }
}

fn member_name(member: &Member, lang: Lang) -> String {
    match lang {
        Lang::En => member.full_name(),
        Lang::Am => member.full_name_am(),
    }
}

macro_rules! next_attr {
    ($old:ident, $new:ident, $attr:ident) => {
        if $old.$attr != $new.$attr {
            format!(" -> {}", $new.$attr)
        } else {
            "".to_string()
        }
    };
}

pub trait PrintFormatted {
    fn print_formatted(&self, lang: Lang);
}

impl PrintFormatted for Member {
    fn print_formatted(&self, _lang: Lang) {
        let dob = match self.date_of_birth {
            Some(date) => date.to_string(),
            None => "None".to_string(),
        };
        println!("Member No.:\t\t{}", self.id);
        println!("Name:\t\t\t{}", self.full_name());
        println!("Name (Amharic):\t\t{}", self.full_name_am());
        println!("Date of Birth:\t\t{}", dob);
        println!("Email:\t\t\t{}", self.email);
        println!("Phone:\t\t\t{}", self.phone);
        println!("City:\t\t\t{}", self.city);
        println!("Street:\t\t\t{}", self.street);
        println!(
            "Photo:\t\t\t{}",
            self.photo_url.as_deref().unwrap_or("None")
        );
        println!("Status:\t\t\t{}", self.status);
        println!("Registered:\t\t{}", self.registered_at);
    }
}

impl PrintFormatted for (Member, Member) {
    fn print_formatted(&self, _lang: Lang) {
        let (old, new) = self;
        let next_first = next_attr!(old, new, first_name);
        println!("First Name:\t\t{}{}", old.first_name, next_first);
        let next_last = next_attr!(old, new, last_name);
        println!("Last Name:\t\t{}{}", old.last_name, next_last);
        let next_first_am = next_attr!(old, new, first_name_am);
        println!("First (Amharic):\t{}{}", old.first_name_am, next_first_am);
        let next_last_am = next_attr!(old, new, last_name_am);
        println!("Last (Amharic):\t\t{}{}", old.last_name_am, next_last_am);
        let next_email = next_attr!(old, new, email);
        println!("Email:\t\t\t{}{}", old.email, next_email);
        let next_phone = next_attr!(old, new, phone);
        println!("Phone:\t\t\t{}{}", old.phone, next_phone);
        let next_city = next_attr!(old, new, city);
        println!("City:\t\t\t{}{}", old.city, next_city);
        let next_street = next_attr!(old, new, street);
        println!("Street:\t\t\t{}{}", old.street, next_street);
        let next_status = next_attr!(old, new, status);
        println!("Status:\t\t\t{}{}", old.status, next_status);
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self, lang: Lang) {
        println!(
            "{:<10}\t{:<28}\t{:<28}\t{:<16}\t{:<10}\t{}",
            "No.", "Name", "Email", "Phone", "Status", "Registered"
        );
        println!("{:-<120}", "-");
        for member in self {
            println!(
                "{:<10}\t{:<28}\t{:<28}\t{:<16}\t{:<10}\t{}",
                member.id,
                member_name(member, lang),
                member.email,
                member.phone,
                member.status.to_string(),
                member.registered_at.format("%Y-%m-%d"),
            );
        }
    }
}

impl PrintFormatted for Vec<Payment> {
    fn print_formatted(&self, _lang: Lang) {
        println!("{:>8}\t{}", "Round", "Opened");
        println!("{:-<40}", "-");
        for payment in self {
            println!(
                "{:>8}\t{}",
                payment.number,
                payment.created_at.format("%Y-%m-%d"),
            );
        }
    }
}

impl PrintFormatted for Vec<(Member, PaymentEntry)> {
    fn print_formatted(&self, lang: Lang) {
        println!(
            "{:<10}\t{:<28}\t{:<12}\t{:<16}\t{:<10}\t{:<10}\t{}",
            "No.", "Name", "Paid On", "Place", "Method", "Receipt", "Remark"
        );
        println!("{:-<120}", "-");
        for (member, entry) in self {
            println!(
                "{:<10}\t{:<28}\t{:<12}\t{:<16}\t{:<10}\t{:<10}\t{}",
                member.id,
                member_name(member, lang),
                entry.paid_on.to_string(),
                entry.place,
                entry.method,
                entry.receipt_no,
                entry.remark,
            );
        }
    }
}

impl PrintFormatted for Vec<PaymentEntry> {
    fn print_formatted(&self, _lang: Lang) {
        println!(
            "{:>8}\t{:<12}\t{:<16}\t{:<10}\t{:<10}\t{}",
            "Round", "Paid On", "Place", "Method", "Receipt", "Remark"
        );
        println!("{:-<100}", "-");
        for entry in self {
            println!(
                "{:>8}\t{:<12}\t{:<16}\t{:<10}\t{:<10}\t{}",
                entry.payment_number,
                entry.paid_on.to_string(),
                entry.place,
                entry.method,
                entry.receipt_no,
                entry.remark,
            );
        }
    }
}

impl PrintFormatted for Vec<Post> {
    fn print_formatted(&self, lang: Lang) {
        println!(
            "{:>4}\t{:>4}\t{:<14}\t{:<40}\t{:<10}\t{}",
            "ID", "Pos", "Section", "Header", "Image", "Created"
        );
        println!("{:-<110}", "-");
        for post in self {
            let header = match lang {
                Lang::En => &post.header,
                Lang::Am => &post.header_am,
            };
            let image = if post.image_url.is_some() { "yes" } else { "" };
            println!(
                "{:>4}\t{:>4}\t{:<14}\t{:<40}\t{:<10}\t{}",
                post.id,
                post.position,
                post.section.to_string(),
                header,
                image,
                post.created_at.format("%Y-%m-%d"),
            );
        }
    }
}

impl PrintFormatted for Vec<FormDoc> {
    fn print_formatted(&self, lang: Lang) {
        println!(
            "{:>4}\t{:<30}\t{:<40}\t{}",
            "ID", "Name", "File", "Created"
        );
        println!("{:-<100}", "-");
        for form in self {
            let name = match lang {
                Lang::En => &form.name,
                Lang::Am => &form.name_am,
            };
            println!(
                "{:>4}\t{:<30}\t{:<40}\t{}",
                form.id,
                name,
                form.file_url,
                form.created_at.format("%Y-%m-%d"),
            );
        }
    }
}

impl PrintFormatted for Vec<Obituary> {
    fn print_formatted(&self, lang: Lang) {
        println!(
            "{:>4}\t{:<28}\t{:<12}\t{:<10}\t{}",
            "ID", "Name", "Died On", "Image", "Posted"
        );
        println!("{:-<80}", "-");
        for obituary in self {
            let name = match lang {
                Lang::En => obituary.full_name(),
                Lang::Am => format!(
                    "{} {}",
                    obituary.first_name_am, obituary.last_name_am
                ),
            };
            let died = match obituary.died_on {
                Some(date) => date.to_string(),
                None => "".to_string(),
            };
            let image = if obituary.image_url.is_some() { "yes" } else { "" };
            println!(
                "{:>4}\t{:<28}\t{:<12}\t{:<10}\t{}",
                obituary.id,
                name,
                died,
                image,
                obituary.created_at.format("%Y-%m-%d"),
            );
        }
    }
}

impl PrintFormatted for Vec<BoardMember> {
    fn print_formatted(&self, lang: Lang) {
        println!(
            "{:>4}\t{:<28}\t{:<20}\t{}",
            "ID", "Name", "Role", "Image"
        );
        println!("{:-<70}", "-");
        for board_member in self {
            let name = match lang {
                Lang::En => board_member.full_name(),
                Lang::Am => format!(
                    "{} {}",
                    board_member.first_name_am, board_member.last_name_am
                ),
            };
            let image = if board_member.image_url.is_some() { "yes" } else { "" };
            println!(
                "{:>4}\t{:<28}\t{:<20}\t{}",
                board_member.id, name, board_member.role_title, image,
            );
        }
    }
}

impl PrintFormatted for Vec<Admin> {
    fn print_formatted(&self, _lang: Lang) {
        println!("{:<30}\t{:<20}\t{}", "Email", "Name", "Role");
        println!("{:-<70}", "-");
        for admin in self {
            println!(
                "{:<30}\t{:<20}\t{}",
                admin.email,
                admin.name,
                admin.role.to_string(),
            );
        }
    }
}
